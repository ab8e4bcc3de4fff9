//! Admin form rendering and submission decoding.
//!
//! Controls are named `{bundle_id}[{field}]` (checkboxes `{bundle_id}[{field}][]`)
//! so a submitted form decodes straight back into a `SettingsBundle`.
//!
//! Values are written into the markup as stored, without HTML escaping. An
//! admin who can save settings can therefore inject markup into this page.

use std::fmt::Write as _;

use crate::schema::{FieldKind, FieldSpec, FieldValue};
use crate::settings::SettingsBundle;

/// Render one table row per field.
pub fn render(fields: &[FieldSpec], bundle: &SettingsBundle, bundle_id: &str) -> String {
    let mut out = String::new();
    for field in fields {
        let value = bundle.get(&field.name).unwrap_or(&field.default_value);
        let control = render_control(field, value, bundle_id);
        let description = if field.description.is_empty() {
            String::new()
        } else {
            format!("<div><em>{}</em></div>", field.description)
        };
        let _ = write!(
            out,
            "\n<tr valign=\"top\"><th scope=\"row\">{}</th><td>{control}{description}</td></tr>\n",
            field.label
        );
    }
    out
}

fn render_control(field: &FieldSpec, value: &FieldValue, bundle_id: &str) -> String {
    let name = format!("{bundle_id}[{}]", field.name);
    let mut html = String::new();
    match field.kind {
        FieldKind::Select => {
            let _ = write!(html, "<select name=\"{name}\">");
            for (option_value, option_label) in &field.options {
                let selected = if value.contains(option_value) {
                    "selected=\"selected\""
                } else {
                    ""
                };
                let _ = write!(
                    html,
                    "<option value=\"{option_value}\" {selected}>{option_label}</option>"
                );
            }
            html.push_str("</select>");
        }
        FieldKind::Checkbox | FieldKind::Radio => {
            let suffix = if field.kind == FieldKind::Checkbox { "[]" } else { "" };
            for (option_value, option_label) in &field.options {
                let checked = if value.contains(option_value) {
                    "checked=\"checked\""
                } else {
                    ""
                };
                let _ = write!(
                    html,
                    "<input name=\"{name}{suffix}\" type=\"{}\" value=\"{option_value}\" {checked} />{option_label}{}",
                    field.kind.html_type(),
                    field.option_separator
                );
            }
        }
        FieldKind::Textarea => {
            let _ = write!(
                html,
                "<textarea name=\"{name}\" rows=\"{}\" cols=\"{}\">{}</textarea>",
                field.layout.rows.unwrap_or(0),
                field.layout.cols.unwrap_or(0),
                value.as_str()
            );
        }
        FieldKind::Text => {
            let _ = write!(
                html,
                "<input name=\"{name}\" type=\"{}\" value=\"{}\" size=\"{}\" />",
                field.kind.html_type(),
                value.as_str(),
                field.layout.size.unwrap_or(0)
            );
        }
    }
    html
}

/// Render the complete settings page: heading, form posting to
/// `options.php`, the field table and a Save button.
pub fn render_page(
    title: &str,
    fields: &[FieldSpec],
    bundle: &SettingsBundle,
    bundle_id: &str,
) -> String {
    format!(
        concat!(
            "\n<div class=\"wrap\">\n",
            "  <h2>{title} Settings</h2>\n",
            "  <form method=\"post\" action=\"options.php\">\n",
            "    <input type=\"hidden\" name=\"option_page\" value=\"{id}\" />\n",
            "    <table class=\"form-table\">{rows}    </table>\n",
            "    <p class=\"submit\"><input type=\"submit\" class=\"button-primary\" value=\"Save\" /></p>\n",
            "  </form>\n",
            "</div>\n"
        ),
        title = title,
        id = bundle_id,
        rows = render(fields, bundle, bundle_id),
    )
}

/// Decode an `application/x-www-form-urlencoded` submission of the page
/// rendered for `bundle_id`.
///
/// `{id}[name]=v` becomes a scalar (last occurrence wins) and
/// `{id}[name][]=v` appends to a sequence. Keys outside the bundle are
/// ignored.
pub fn parse_submission(bundle_id: &str, body: &str) -> SettingsBundle {
    let prefix = format!("{bundle_id}[");
    let mut bundle = SettingsBundle::new();
    for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
        let Some(rest) = key.strip_prefix(prefix.as_str()) else {
            continue;
        };
        if let Some(name) = rest.strip_suffix("][]") {
            let mut values = match bundle.get(name) {
                Some(FieldValue::Multi(existing)) => existing.clone(),
                _ => Vec::new(),
            };
            values.push(value.into_owned());
            bundle.set(name, values);
        } else if let Some(name) = rest.strip_suffix(']') {
            bundle.set(name, value.into_owned());
        }
    }
    bundle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{webservice_fields, FieldDef};

    const ID: &str = "svc_options";

    #[test]
    fn text_field_renders_input_with_size() {
        let fields = vec![FieldDef::new("url").label("API Url").size(100).with_defaults()];
        let bundle: SettingsBundle = [("url", "http://x")].into_iter().collect();
        let html = render(&fields, &bundle, ID);
        assert!(html.contains(
            r#"<input name="svc_options[url]" type="text" value="http://x" size="100" />"#
        ));
        assert!(html.contains(r#"<th scope="row">API Url</th>"#));
    }

    #[test]
    fn unset_size_renders_zero() {
        let fields = vec![FieldDef::new("plain").with_defaults()];
        let html = render(&fields, &SettingsBundle::new(), ID);
        assert!(html.contains(r#"value="" size="0""#));
    }

    #[test]
    fn select_marks_current_value() {
        let fields = webservice_fields();
        let bundle: SettingsBundle = [("method", "POST")].into_iter().collect();
        let html = render(&fields[1..2], &bundle, ID);
        assert!(html.contains(r#"<select name="svc_options[method]">"#));
        assert!(html.contains(r#"<option value="POST" selected="selected">POST</option>"#));
        assert!(html.contains(r#"<option value="GET" >GET</option>"#));
    }

    #[test]
    fn missing_value_falls_back_to_default() {
        let fields = webservice_fields();
        let html = render(&fields[2..3], &SettingsBundle::new(), ID);
        assert!(html.contains(r#"<option value="text/html" selected="selected">HTML</option>"#));
    }

    #[test]
    fn checkbox_is_multi_valued_and_separated() {
        let fields = vec![FieldDef::new("tags")
            .kind(FieldKind::Checkbox)
            .options([("a", "Alpha"), ("b", "Beta")])
            .option_separator("<br>")
            .with_defaults()];
        let bundle: SettingsBundle = [("tags", vec!["b".to_string()])].into_iter().collect();
        let html = render(&fields, &bundle, ID);
        assert!(html.contains(
            r#"<input name="svc_options[tags][]" type="checkbox" value="a"  />Alpha<br>"#
        ));
        assert!(html.contains(
            r#"<input name="svc_options[tags][]" type="checkbox" value="b" checked="checked" />Beta<br>"#
        ));
    }

    #[test]
    fn radio_is_single_valued() {
        let fields = vec![FieldDef::new("mode")
            .kind(FieldKind::Radio)
            .options([("x", "X")])
            .value("x")
            .with_defaults()];
        let html = render(&fields, &SettingsBundle::new(), ID);
        assert!(html.contains(
            r#"<input name="svc_options[mode]" type="radio" value="x" checked="checked" />X"#
        ));
    }

    #[test]
    fn textarea_echoes_raw_value_with_description() {
        let fields = webservice_fields();
        let bundle: SettingsBundle = [("headers", "X-A=1\n<b>raw</b>")].into_iter().collect();
        let html = render(&fields[4..5], &bundle, ID);
        assert!(html.contains(
            "<textarea name=\"svc_options[headers]\" rows=\"5\" cols=\"100\">X-A=1\n<b>raw</b></textarea>"
        ));
        assert!(html
            .contains("<div><em>One header per line in the format: header=value</em></div>"));
    }

    #[test]
    fn page_wraps_rows_in_form() {
        let fields = webservice_fields();
        let bundle = SettingsBundle::defaults(&fields);
        let page = render_page("ZnWP WebService", &fields, &bundle, ID);
        assert!(page.contains("<h2>ZnWP WebService Settings</h2>"));
        assert!(page.contains(r#"<form method="post" action="options.php">"#));
        assert_eq!(page.matches("<tr valign=\"top\">").count(), fields.len());
        assert!(page.contains(r#"value="Save""#));
    }

    #[test]
    fn submission_decodes_scalars_and_sequences() {
        let body = "option_page=svc_options\
                    &svc_options%5Burl%5D=http%3A%2F%2Fx%2Fa%3Fb%3D1\
                    &svc_options%5Bheaders%5D=X-A%3D1%0D%0AX-B%3D2\
                    &svc_options%5Btags%5D%5B%5D=a\
                    &svc_options%5Btags%5D%5B%5D=c\
                    &other%5Burl%5D=ignored";
        let bundle = parse_submission(ID, body);
        assert_eq!(bundle.get_str("url"), "http://x/a?b=1");
        assert_eq!(bundle.get_str("headers"), "X-A=1\r\nX-B=2");
        assert_eq!(
            bundle.get("tags"),
            Some(&FieldValue::Multi(vec!["a".into(), "c".into()]))
        );
        assert_eq!(bundle.len(), 3);
    }

    #[test]
    fn rendered_defaults_survive_a_submission_round_trip() {
        let fields = webservice_fields();
        let bundle = SettingsBundle::defaults(&fields);
        let body: String = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(
                bundle
                    .iter()
                    .map(|(k, v)| (format!("{ID}[{k}]"), v.as_str().to_string())),
            )
            .finish();
        assert_eq!(parse_submission(ID, &body), bundle);
    }
}
