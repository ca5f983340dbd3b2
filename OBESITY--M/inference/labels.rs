/// Generic advice for labels without a dedicated recommendation.
pub const FALLBACK_RECOMMENDATION: &str = "Consulte um profissional de saúde.";

const TRANSLATIONS: [(&str, &str); 6] = [
    ("Insufficient_Weight", "Baixo Peso"),
    ("Normal_Weight", "Peso Normal"),
    ("Overweight_Level_I", "Sobrepeso Nível I"),
    ("Obesity_Type_I", "Obesidade Tipo I"),
    ("Obesity_Type_II", "Obesidade Tipo II"),
    ("Obesity_Type_III", "Obesidade Tipo III"),
];

const RECOMMENDATIONS: [(&str, &str); 6] = [
    (
        "Baixo Peso",
        "- Aumentar consumo calórico de forma saudável
- Incluir proteínas magras e carboidratos complexos
- Consultar nutricionista para plano alimentar
- Exercícios de força para ganho muscular",
    ),
    (
        "Peso Normal",
        "- Manter hábitos alimentares saudáveis
- Continuar com atividade física regular
- Monitorar peso mensalmente
- Manter hidratação adequada",
    ),
    (
        "Sobrepeso Nível I",
        "- Reduzir calorias em 200-300 por dia
- Aumentar atividade física para 150 min/semana
- Reduzir alimentos processados e açúcares
- Acompanhar ingestão alimentar",
    ),
    (
        "Obesidade Tipo I",
        "- Consultar médico e nutricionista
- Redução calórica supervisionada
- Exercícios aeróbicos 30 min/dia, 5x/semana
- Monitorar progresso semanalmente",
    ),
    (
        "Obesidade Tipo II",
        "- Acompanhamento médico obrigatório
- Plano alimentar personalizado
- Atividade física supervisionada
- Considerar acompanhamento psicológico",
    ),
    (
        "Obesidade Tipo III",
        "- Intervenção médica imediata
- Tratamento multidisciplinar
- Possível indicação cirúrgica
- Acompanhamento intensivo",
    ),
];

/// Portuguese name of a model label; unknown labels pass through.
#[must_use]
pub fn translate(label: &str) -> &str {
    TRANSLATIONS
        .iter()
        .find(|(english, _)| *english == label)
        .map_or(label, |(_, localized)| *localized)
}

/// Recommendation text for a translated label.
#[must_use]
pub fn recommend(localized_label: &str) -> &'static str {
    RECOMMENDATIONS
        .iter()
        .find(|(label, _)| *label == localized_label)
        .map_or(FALLBACK_RECOMMENDATION, |(_, text)| *text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_label_has_translation_and_advice() {
        for (english, localized) in TRANSLATIONS {
            assert_eq!(translate(english), localized);
            let advice = recommend(translate(english));
            assert_ne!(advice, FALLBACK_RECOMMENDATION);
            assert_eq!(advice.lines().count(), 4);
        }
    }

    #[test]
    fn unknown_labels_fall_back() {
        assert_eq!(translate("Overweight_Level_II"), "Overweight_Level_II");
        assert_eq!(recommend(translate("Overweight_Level_II")), FALLBACK_RECOMMENDATION);
        assert_eq!(recommend("Peso normal"), FALLBACK_RECOMMENDATION);
    }
}
