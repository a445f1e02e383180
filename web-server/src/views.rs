//! Server-rendered pages for the two screens

use mindcheck_core::logic::features::schema::{
    self, DietaryHabits, IntRange, Profession, Status, SuicidalThoughts,
};
use mindcheck_core::RiskAssessment;

use crate::form::AssessForm;

const STYLE: &str = r#"
body { background: #ffffff; font-family: Arial, sans-serif; margin: 0; }
main { background: #e6f0fa; padding: 20px; border-radius: 10px; max-width: 860px; margin: 24px auto; }
h1 { color: #1e3a8a; text-align: center; }
fieldset { border: 1px solid #d1e0ff; border-radius: 8px; margin: 12px 0; background: #f5faff; }
label { display: block; margin: 8px 0; }
button { background: #4CAF50; color: white; border: 0; border-radius: 8px; padding: 10px 20px; font-weight: bold; cursor: pointer; }
button:hover { background: #45a049; }
.result-box, .quote-box { background: #F5ECE0; padding: 20px; border-radius: 10px; margin: 20px auto; text-align: center; max-width: 600px; }
.quote-text { font-style: italic; font-size: 18px; color: #2c5282; }
.quote-author { font-weight: bold; color: #1a4971; }
.error { background: #fde2e1; color: #8a1c1c; padding: 12px; border-radius: 8px; }
.tier-High { color: #9a3412; } .tier-Moderate { color: #1e40af; } .tier-Low { color: #166534; }
"#;

/// Minimal HTML escaping for values echoed into the page
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{}</title><style>{}</style></head><body><main>{}</main></body></html>",
        escape(title),
        STYLE,
        body
    )
}

pub fn landing() -> String {
    page(
        "Depression Risk Predictor",
        r#"<h1>Welcome to the Depression Risk Predictor 🧠</h1>
<p>This tool helps you assess your risk of depression based on various lifestyle and personal factors.
By answering a few questions, you can gain insights into your mental health and take proactive steps if needed.
All inputs are confidential and used solely for prediction purposes.</p>
<div class="quote-box">
  <p class="quote-text">“You don’t have to control your thoughts. You just have to stop letting them control you.”</p>
  <p class="quote-author">— Dan Millman</p>
</div>
<form method="post" action="/start"><button type="submit">Get Started 🔍</button></form>"#,
    )
}

fn select<T: std::fmt::Display>(name: &str, label: &str, options: &[T], selected: &str) -> String {
    let options: String = options
        .iter()
        .map(|o| {
            let value = o.to_string();
            let mark = if value == selected { " selected" } else { "" };
            format!("<option value=\"{0}\"{1}>{0}</option>", escape(&value), mark)
        })
        .collect();
    format!(
        "<label>{}<br><select name=\"{}\">{}</select></label>",
        escape(label),
        name,
        options
    )
}

fn slider(name: &str, label: &str, range: &IntRange, value: &str) -> String {
    format!(
        "<label>{} <output>{}</output><br>\
         <input type=\"range\" name=\"{}\" min=\"{}\" max=\"{}\" step=\"1\" value=\"{}\" \
         oninput=\"this.previousElementSibling.previousElementSibling.value=this.value\"></label>",
        escape(label),
        escape(value),
        name,
        range.min,
        range.max,
        escape(value)
    )
}

fn checkbox(name: &str, label: &str, checked: bool) -> String {
    format!(
        "<label><input type=\"checkbox\" name=\"{}\"{}> {}</label>",
        name,
        if checked { " checked" } else { "" },
        escape(label)
    )
}

fn result_box(assessment: &RiskAssessment) -> String {
    let tier = assessment.tier;
    format!(
        "<div class=\"result-box\">\
         <p>🧪 Predicted Probability of Depression: <strong>{}</strong></p>\
         <progress max=\"1\" value=\"{:.4}\"></progress>\
         <p class=\"tier-{}\">{}</p></div>",
        assessment.percent(),
        assessment.probability,
        tier.as_str(),
        escape(tier.message())
    )
}

/// Outcome shown under the form
pub enum Outcome<'a> {
    None,
    Message(&'a str),
    Result(&'a RiskAssessment),
}

pub fn form(values: &AssessForm, outcome: Outcome<'_>) -> String {
    let mut body = String::new();
    body.push_str("<h1>🧠 Depression Risk Predictor</h1>");
    body.push_str("<p>Fill in the details below to assess your depression risk.</p>");
    body.push_str(
        "<form method=\"post\" action=\"/home\"><button type=\"submit\">Back to Home</button></form>",
    );

    body.push_str("<form method=\"post\" action=\"/assess\">");

    body.push_str("<fieldset><legend>Personal Information</legend>");
    body.push_str(&format!(
        "<label>Age<br><input type=\"number\" name=\"age\" min=\"{}\" max=\"{}\" step=\"1\" value=\"{}\"></label>",
        schema::AGE.min,
        schema::AGE.max,
        escape(&values.age)
    ));
    body.push_str(&select(
        "suicidal_thoughts",
        "Have you ever had suicidal thoughts?",
        SuicidalThoughts::ALL,
        &values.suicidal_thoughts,
    ));
    body.push_str(&select("status", "Student or Working Professional?", Status::ALL, &values.status));
    body.push_str("</fieldset>");

    body.push_str("<fieldset><legend>Academic/Work and Financial Details</legend>");
    body.push_str(&slider(
        "academic_work_pressure",
        "Academic/Work Pressure",
        &schema::ACADEMIC_WORK_PRESSURE,
        &values.academic_work_pressure,
    ));
    body.push_str(&slider("financial_stress", "Financial Stress", &schema::FINANCIAL_STRESS, &values.financial_stress));
    body.push_str(&slider(
        "academic_work_satisfaction",
        "Academic/Work Satisfaction",
        &schema::ACADEMIC_WORK_SATISFACTION,
        &values.academic_work_satisfaction,
    ));
    body.push_str(&slider(
        "work_study_hours",
        "Work/Study Hours per Day",
        &schema::WORK_STUDY_HOURS,
        &values.work_study_hours,
    ));
    body.push_str("</fieldset>");

    body.push_str("<fieldset><legend>Education and Profession</legend>");
    body.push_str(&checkbox("no_cgpa", "No CGPA (not applicable)", values.cgpa_not_applicable()));
    body.push_str(&format!(
        "<label>CGPA (0.00–10.00)<br><input type=\"number\" name=\"cgpa\" min=\"0\" max=\"10\" step=\"0.01\" value=\"{}\"></label>",
        escape(&values.cgpa)
    ));
    body.push_str(&checkbox("no_job", "No job (i.e., not working currently)", values.no_job()));
    body.push_str(&select("profession", "Profession", Profession::ALL, &values.profession));
    body.push_str("</fieldset>");

    body.push_str("<fieldset><legend>Lifestyle</legend>");
    body.push_str(&select("dietary_habits", "Dietary Habits", DietaryHabits::ALL, &values.dietary_habits));
    body.push_str(&slider("sleep_duration", "Sleep Duration (hours)", &schema::SLEEP_DURATION, &values.sleep_duration));
    body.push_str("</fieldset>");

    body.push_str("<button type=\"submit\">🔍 Predict Depression Risk</button></form>");

    match outcome {
        Outcome::None => {}
        Outcome::Message(message) => {
            body.push_str(&format!("<p class=\"error\">{}</p>", escape(message)));
        }
        Outcome::Result(assessment) => body.push_str(&result_box(assessment)),
    }

    page("Depression Risk Predictor", &body)
}

pub fn internal_error() -> String {
    page(
        "Something went wrong",
        "<h1>Something went wrong</h1><p>The prediction could not be completed. Please try again later.</p>\
         <form method=\"post\" action=\"/home\"><button type=\"submit\">Back to Home</button></form>",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_form_keeps_selection() {
        let values = AssessForm {
            profession: "UX/UI Designer".to_string(),
            ..AssessForm::default()
        };
        let html = form(&values, Outcome::None);
        assert!(html.contains("<option value=\"UX/UI Designer\" selected>"));
        assert!(!html.contains("value=\"missing\""));
    }

    #[test]
    fn test_result_box() {
        let html = form(&AssessForm::default(), Outcome::Result(&RiskAssessment::from_probability(0.75)));
        assert!(html.contains("75.00%"));
        assert!(html.contains("This indicates a higher risk."));
    }
}
