use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use super::editor::{EditorState, EditorView, FieldControl};
use super::schema::FieldKind;

/// Render the editor form: one control per field, then status and save.
pub fn render_form(view: &EditorView) -> String {
    let mut html = String::new();
    let _ = writeln!(
        html,
        r#"<form class="content-editor" data-content-key="{}" data-state="{}">"#,
        attr(&view.content_key),
        view.state
    );
    let _ = writeln!(html, "  <h2>{}</h2>", text(&view.title));

    for control in &view.controls {
        render_control(&mut html, control);
    }

    if let Some(error) = &view.error {
        let _ = writeln!(html, r#"  <p class="error" role="alert">{}</p>"#, text(error));
    }
    if let Some(status) = &view.status {
        let _ = writeln!(html, r#"  <p class="status">{}</p>"#, text(status));
    }

    let label = if view.state == EditorState::Saving {
        "Saving..."
    } else {
        "Save"
    };
    let disabled = if view.can_save { "" } else { " disabled" };
    let _ = writeln!(html, r#"  <button type="submit"{}>{}</button>"#, disabled, label);
    html.push_str("</form>\n");
    html
}

fn render_control(html: &mut String, control: &FieldControl) {
    let id = format!("field-{}", control.key);
    let placeholder = control
        .placeholder
        .as_deref()
        .map(|p| format!(r#" placeholder="{}""#, attr(p)))
        .unwrap_or_default();

    let _ = writeln!(html, r#"  <div class="field field-{}">"#, control.kind.as_str());
    let _ = writeln!(
        html,
        r#"    <label for="{}">{}</label>"#,
        attr(&id),
        text(&control.label)
    );

    match control.kind {
        FieldKind::PlainText => {
            let _ = writeln!(
                html,
                r#"    <input type="text" id="{}" name="{}" value="{}"{}>"#,
                attr(&id),
                attr(&control.key),
                attr(&control.value),
                placeholder
            );
        }
        FieldKind::MultilineText => {
            let _ = writeln!(
                html,
                r#"    <textarea id="{}" name="{}" rows="6"{}>{}</textarea>"#,
                attr(&id),
                attr(&control.key),
                placeholder,
                text(&control.value)
            );
        }
        FieldKind::ImageReference => {
            if !control.value.is_empty() {
                let _ = writeln!(
                    html,
                    r#"    <img class="preview" src="{}" alt="{}">"#,
                    attr(&control.value),
                    attr(&control.label)
                );
            }
            let _ = writeln!(
                html,
                r#"    <input type="url" id="{}" name="{}" value="{}"{}>"#,
                attr(&id),
                attr(&control.key),
                attr(&control.value),
                placeholder
            );
            let disabled = if control.uploading { " disabled" } else { "" };
            let _ = writeln!(
                html,
                r#"    <input type="file" accept="image/*" data-field="{}"{}>"#,
                attr(&control.key),
                disabled
            );
            if control.uploading {
                html.push_str("    <span class=\"uploading\">Uploading...</span>\n");
            }
        }
    }

    html.push_str("  </div>\n");
}

/// Terminal view for a key with no schema: no fields, no save.
pub fn render_unknown_key(content_key: &str) -> String {
    format!(
        "<div class=\"content-editor unknown\">\n  <p class=\"error\">Unknown key: {}</p>\n</div>\n",
        text(content_key)
    )
}
