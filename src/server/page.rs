use crate::predict::{
    AGE_RANGE, FARE_RANGE, PCLASS_OPTIONS, PORTS, PassengerQuery, Prediction, SEX_OPTIONS,
};

const DEFAULT_AGE: f64 = 30.0;
const DEFAULT_FARE: f64 = 32.0;

const STYLE: &str = "\
body{font-family:sans-serif;max-width:46rem;margin:2rem auto;padding:0 1rem;color:#222}\
.cols{display:grid;grid-template-columns:1fr 1fr;gap:1rem}\
label{display:block;margin:.6rem 0 .2rem}\
select,input{width:100%;padding:.4rem;box-sizing:border-box}\
button{width:100%;margin-top:1.2rem;padding:.6rem;font-size:1rem;background:#ff4b4b;color:#fff;border:0;border-radius:.4rem}\
.verdict{padding:.8rem;border-radius:.4rem;font-weight:bold}\
.ok{background:#e6f4ea;color:#1e7e34}.bad{background:#fdecea;color:#b02a37}\
.metric{font-size:1.8rem}\
table{border-collapse:collapse;margin-top:.5rem}td,th{border:1px solid #ccc;padding:.3rem .6rem}\
footer{text-align:center;color:gray;font-size:.8em;margin-top:2rem}";

/// What to show under the form.
pub enum Outcome<'a> {
    Empty,
    Predicted(&'a Prediction),
    Failed(&'a str),
}

/// Render the whole page. `query` pre-fills the form when present.
pub fn render(query: Option<&PassengerQuery>, outcome: &Outcome<'_>) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<title>Titanic Survival Predictor</title>\n");
    html.push_str(&format!("<style>{STYLE}</style>\n</head>\n<body>\n"));
    html.push_str("<h1>&#128674; Titanic Survival Predictor</h1>\n");
    html.push_str(
        "<p>This app predicts whether a passenger would have survived the Titanic disaster \
         based on their characteristics.</p>\n<p><strong>Enter the passenger details below:</strong></p>\n<hr>\n",
    );

    render_form(&mut html, query);

    match outcome {
        Outcome::Empty => {}
        Outcome::Predicted(prediction) => {
            if let Some(query) = query {
                render_prediction(&mut html, query, prediction);
            }
        }
        Outcome::Failed(message) => {
            html.push_str("<h3>Prediction Result</h3>\n");
            html.push_str(&format!(
                "<div class=\"verdict bad\">Could not make a prediction: {}</div>\n",
                escape_html(message)
            ));
        }
    }

    html.push_str(
        "<hr>\n<footer><p>Model: Logistic Regression with Pipeline</p></footer>\n</body>\n</html>\n",
    );
    html
}

fn render_form(html: &mut String, query: Option<&PassengerQuery>) {
    let pclass = query.map_or(PCLASS_OPTIONS[0], |q| q.pclass);
    let sex = query.map_or(SEX_OPTIONS[0], |q| q.sex.as_str());
    let age = query.map_or(DEFAULT_AGE, |q| q.age);
    let fare = query.map_or(DEFAULT_FARE, |q| q.fare);
    let embarked = query.map_or(PORTS[0].0, |q| q.embarked.as_str());

    html.push_str("<form method=\"post\" action=\"/predict\">\n<div class=\"cols\">\n<div>\n");

    html.push_str("<label for=\"pclass\">Passenger Class</label>\n");
    html.push_str("<select id=\"pclass\" name=\"pclass\" title=\"1st = Upper, 2nd = Middle, 3rd = Lower\">\n");
    for option in PCLASS_OPTIONS {
        push_option(html, &option.to_string(), &pclass_label(option), option == pclass);
    }
    html.push_str("</select>\n");

    html.push_str("<label for=\"sex\">Sex</label>\n<select id=\"sex\" name=\"sex\">\n");
    for option in SEX_OPTIONS {
        push_option(html, option, &capitalize(option), option == sex);
    }
    html.push_str("</select>\n");

    html.push_str(&format!(
        "<label for=\"age\">Age</label>\n\
         <input id=\"age\" name=\"age\" type=\"number\" min=\"{}\" max=\"{}\" step=\"1\" value=\"{}\" title=\"Age in years\" required>\n",
        AGE_RANGE.start(),
        AGE_RANGE.end(),
        age
    ));

    html.push_str("</div>\n<div>\n");

    html.push_str(&format!(
        "<label for=\"fare\">Fare (&pound;)</label>\n\
         <input id=\"fare\" name=\"fare\" type=\"number\" min=\"{}\" max=\"{}\" step=\"1\" value=\"{}\" title=\"Passenger fare in British Pounds\" required>\n",
        FARE_RANGE.start(),
        FARE_RANGE.end(),
        fare
    ));

    html.push_str("<label for=\"embarked\">Port of Embarkation</label>\n");
    html.push_str("<select id=\"embarked\" name=\"embarked\">\n");
    for (code, port) in PORTS {
        push_option(html, code, port, code == embarked);
    }
    html.push_str("</select>\n");

    html.push_str("</div>\n</div>\n<button type=\"submit\">&#128302; Predict Survival</button>\n</form>\n");
}

fn push_option(html: &mut String, value: &str, label: &str, selected: bool) {
    html.push_str(&format!(
        "<option value=\"{}\"{}>{}</option>\n",
        escape_html(value),
        if selected { " selected" } else { "" },
        escape_html(label)
    ));
}

fn render_prediction(html: &mut String, query: &PassengerQuery, prediction: &Prediction) {
    html.push_str("<h3>Prediction Result</h3>\n");
    if prediction.survived() {
        html.push_str("<div class=\"verdict ok\">&#9989; SURVIVED</div>\n");
    } else {
        html.push_str("<div class=\"verdict bad\">&#10060; DID NOT SURVIVE</div>\n");
    }

    html.push_str("<div class=\"cols\">\n");
    html.push_str(&format!(
        "<div><div>Survival Probability</div><div class=\"metric\">{}</div></div>\n",
        prediction.survival_percent()
    ));
    html.push_str(&format!(
        "<div><div>Non-Survival Probability</div><div class=\"metric\">{}</div></div>\n",
        prediction.non_survival_percent()
    ));
    html.push_str("</div>\n");

    let summary = query.summary();
    html.push_str("<details>\n<summary>&#128203; View Input Summary</summary>\n<table>\n<tr>");
    for (column, _) in &summary {
        html.push_str(&format!("<th>{column}</th>"));
    }
    html.push_str("</tr>\n<tr>");
    for (_, value) in &summary {
        html.push_str(&format!("<td>{}</td>", escape_html(value)));
    }
    html.push_str("</tr>\n</table>\n</details>\n");
}

/// "1st Class", "2nd Class", "3rd Class".
pub fn pclass_label(pclass: u8) -> String {
    let suffix = match pclass {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    };
    format!("{pclass}{suffix} Class")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> PassengerQuery {
        PassengerQuery {
            pclass: 3,
            sex: "male".into(),
            age: 25.0,
            fare: 7.25,
            embarked: "Q".into(),
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(pclass_label(1), "1st Class");
        assert_eq!(pclass_label(2), "2nd Class");
        assert_eq!(pclass_label(3), "3rd Class");
        assert_eq!(capitalize("female"), "Female");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
    }

    #[test]
    fn test_empty_page_has_defaults() {
        let html = render(None, &Outcome::Empty);
        assert!(html.contains("<option value=\"1\" selected>1st Class</option>"));
        assert!(html.contains("<option value=\"S\" selected>Southampton</option>"));
        assert!(html.contains("value=\"30\""));
        assert!(html.contains("value=\"32\""));
        assert!(!html.contains("Prediction Result"));
    }

    #[test]
    fn test_prediction_page() {
        let prediction = Prediction {
            label: 0,
            probabilities: [0.935, 0.065],
        };
        let html = render(Some(&query()), &Outcome::Predicted(&prediction));
        assert!(html.contains("DID NOT SURVIVE"));
        assert!(html.contains("6.5%"));
        assert!(html.contains("93.5%"));
        assert!(html.contains("<th>Pclass</th><th>Sex</th><th>Age</th><th>Fare</th><th>Embarked</th>"));
        assert!(html.contains("<td>3</td><td>male</td><td>25.0</td><td>7.25</td><td>Q</td>"));
        assert!(html.contains("<option value=\"3\" selected>3rd Class</option>"));
        assert!(html.contains("<option value=\"Q\" selected>Queenstown</option>"));
    }

    #[test]
    fn test_failure_message_is_escaped() {
        let html = render(None, &Outcome::Failed("unknown value '<script>'"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
