//! Server-side HTML for the patient form and the prediction result.

use std::fmt::Write as _;

use obesity_inference::{
    record::assembler::default_inputs, ArtifactStore, FieldKind, FieldSpec, PredictionReport,
    RawInputs, PATIENT_SCHEMA,
};

/// Outcome of the last submission, if any.
#[derive(Debug)]
pub enum Outcome<'a> {
    /// Nothing submitted yet.
    Empty,
    /// Prediction succeeded.
    Report(&'a PredictionReport),
    /// Prediction failed with a user-facing message.
    Failure(String),
}

const STYLE: &str = "body{font-family:sans-serif;margin:0;display:flex}\
aside{width:280px;background:#f0f2f6;padding:1rem;min-height:100vh}\
main{flex:1;padding:1rem 2rem;max-width:1000px}\
form.patient{display:grid;grid-template-columns:1fr 1fr;gap:.75rem 2rem}\
label{display:block;font-size:.9rem}\
input,select{width:100%}\
.metrics{display:flex;gap:2rem}.metric b{display:block;font-size:1.6rem}\
.success{background:#d4edda;padding:.5rem}.error{background:#f8d7da;padding:.5rem}\
.info{background:#d1ecf1;padding:.5rem}\
.bar{background:#1f77b4;height:1rem}.chart td{padding:2px 6px}";

/// Full page: form pre-filled with `values`, followed by the outcome.
#[must_use]
pub fn render_page(store: &ArtifactStore, values: &RawInputs, outcome: &Outcome<'_>) -> String {
    let mut html = String::with_capacity(8 * 1024);
    html.push_str("<!DOCTYPE html><html lang=\"pt-BR\"><head><meta charset=\"utf-8\">");
    html.push_str("<title>Preditor de Nível de Obesidade</title>");
    let _ = write!(html, "<style>{STYLE}</style></head><body>");
    html.push_str(&render_sidebar());
    html.push_str("<main><h1>🏥 Preditor de Nível de Obesidade</h1>");
    html.push_str(
        "<p>Esta aplicação utiliza machine learning para prever o nível de obesidade \
         com base em características físicas e hábitos.</p>",
    );
    html.push_str(&render_form(store, values));
    match outcome {
        Outcome::Empty => {}
        Outcome::Report(report) => html.push_str(&render_report(report, values)),
        Outcome::Failure(message) => {
            let _ = write!(
                html,
                "<div class=\"error\">❌ Erro ao processar predição: {}</div>\
                 <div class=\"info\">Verifique se todos os campos foram \
                 preenchidos corretamente.</div>",
                escape(message)
            );
        }
    }
    html.push_str(
        "<hr><small>⚠️ Esta ferramenta é para fins educacionais. \
         Consulte um profissional de saúde para diagnóstico médico.</small></main></body></html>",
    );
    html
}

fn render_sidebar() -> String {
    "<aside><h2>📊 Informações do Paciente</h2><hr>\
     <div class=\"info\"><b>Sobre o Modelo:</b><ul>\
     <li>Treinado com múltiplos algoritmos de ML</li>\
     <li>Validação cruzada de 5 folds</li>\
     <li>Precisão: ~90% nos dados de teste</li></ul>\
     <b>Classificações BMI:</b><ul>\
     <li>&lt; 18.5: Baixo peso</li><li>18.5-25: Normal</li><li>25-30: Sobrepeso I</li>\
     <li>30-35: Obesidade I</li><li>35-40: Obesidade II</li><li>&gt; 40: Obesidade III</li>\
     </ul></div></aside>"
        .to_string()
}

/// The sixteen-field form. Missing values fall back to form defaults.
#[must_use]
pub fn render_form(store: &ArtifactStore, values: &RawInputs) -> String {
    let defaults = default_inputs(store.vocabulary());
    let mut html = String::from("<form class=\"patient\" method=\"post\" action=\"/predict\">");
    for spec in &PATIENT_SCHEMA {
        let current = values
            .get(spec.name)
            .or_else(|| defaults.get(spec.name))
            .unwrap_or_default();
        html.push_str("<div>");
        html.push_str(&render_field(store, spec, current));
        html.push_str("</div>");
    }
    html.push_str(
        "<div><button type=\"submit\">🔍 Prever Nível de Obesidade</button></div></form>",
    );
    html
}

fn render_field(store: &ArtifactStore, spec: &FieldSpec, current: &str) -> String {
    let mut html = format!(
        "<label for=\"{name}\">{label}</label>",
        name = spec.name,
        label = escape(spec.label)
    );
    match spec.kind {
        FieldKind::Numeric {
            min,
            max,
            step,
            number_input,
            ..
        } => {
            let kind = if number_input { "number" } else { "range" };
            let _ = write!(
                html,
                "<input type=\"{kind}\" id=\"{name}\" name=\"{name}\" min=\"{min}\" max=\"{max}\" \
                 step=\"{step}\" value=\"{value}\" required>",
                name = spec.name,
                value = escape(current)
            );
        }
        FieldKind::Choice(options) => {
            html.push_str(&render_select(spec.name, options.iter().copied(), current));
        }
        FieldKind::Vocabulary => {
            let options = store.vocabulary().values(spec.name).unwrap_or_default();
            html.push_str(&render_select(
                spec.name,
                options.iter().map(String::as_str),
                current,
            ));
        }
    }
    html
}

fn render_select<'a>(name: &str, options: impl Iterator<Item = &'a str>, current: &str) -> String {
    let mut html = format!("<select id=\"{name}\" name=\"{name}\">");
    for option in options {
        let selected = if option == current { " selected" } else { "" };
        let option = escape(option);
        let _ = write!(html, "<option value=\"{option}\"{selected}>{option}</option>");
    }
    html.push_str("</select>");
    html
}

/// Metrics, predicted label, probability chart, advice and download form.
#[must_use]
pub fn render_report(report: &PredictionReport, values: &RawInputs) -> String {
    let mut html = String::from("<section><div class=\"success\">✅ Predição concluída!</div>");
    let _ = write!(
        html,
        "<div class=\"metrics\">\
         <div class=\"metric\">BMI Calculado<b>{:.2}</b></div>\
         <div class=\"metric\">Categoria BMI<b>{}</b></div>\
         <div class=\"metric\">Confiança da Predição<b>{:.1}%</b></div></div>",
        report.bmi,
        escape(report.bmi_category.label()),
        report.confidence_percent
    );
    let _ = write!(
        html,
        "<h3>📋 Nível de Obesidade Previsto: <strong>{}</strong></h3>",
        escape(&report.translated_label)
    );

    html.push_str("<h3>📊 Probabilidades por Categoria</h3><table class=\"chart\">");
    for bar in &report.probabilities {
        let _ = write!(
            html,
            "<tr><td>{label}</td><td style=\"width:60%\">\
             <div class=\"bar\" style=\"width:{pct}%\"></div></td><td>{pct:.1}%</td></tr>",
            label = escape(&bar.translated_label),
            pct = bar.percent
        );
    }
    html.push_str("</table>");

    html.push_str("<h3>💡 Recomendações</h3><div class=\"info\"><ul>");
    for line in report.recommendation.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let _ = write!(html, "<li>{}</li>", escape(line.trim_start_matches("- ")));
    }
    html.push_str("</ul></div>");

    html.push_str("<form method=\"post\" action=\"/export\">");
    for spec in &PATIENT_SCHEMA {
        if let Some(value) = values.get(spec.name) {
            let _ = write!(
                html,
                "<input type=\"hidden\" name=\"{}\" value=\"{}\">",
                spec.name,
                escape(value)
            );
        }
    }
    html.push_str("<button type=\"submit\">📥 Baixar Relatório</button></form></section>");
    html
}

/// Minimal HTML escaping for text and attribute values.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
