//! User report rendering (CSV and PDF).
//!
//! Both renderers work from sanitized identity views, so a report can never
//! leak a password hash. The PDF writer emits a minimal single-page
//! document by hand: one Helvetica text block, correct xref offsets, no
//! compression.

use keygate_core::IdentityView;

/// Render the active-user report as CSV.
pub fn render_csv(users: &[IdentityView]) -> String {
    let mut out = String::from("id,email,first_name,last_name,level,created_at\n");
    for user in users {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            user.id,
            csv_field(&user.email),
            csv_field(user.first_name.as_deref().unwrap_or("")),
            csv_field(user.last_name.as_deref().unwrap_or("")),
            user.level,
            csv_field(&user.created_at.to_rfc3339()),
        ));
    }
    out
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Render the active-user report as a single-page PDF.
pub fn render_pdf(users: &[IdentityView]) -> Vec<u8> {
    let mut lines: Vec<(u32, String)> = vec![
        (16, "Users Report".to_string()),
        (
            10,
            format!("Generated {}", chrono::Utc::now().format("%Y-%m-%d %H:%M UTC")),
        ),
        (10, format!("Total users: {}", users.len())),
        (10, String::new()),
        (10, "ID  Email  Name  Level".to_string()),
    ];
    for user in users {
        let name = [user.first_name.as_deref(), user.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        lines.push((
            10,
            format!("{}  {}  {}  {}", user.id, user.email, name, user.level),
        ));
    }

    let mut content = String::from("BT\n50 760 Td\n");
    for (size, text) in &lines {
        content.push_str(&format!("/F1 {size} Tf\n({}) Tj\n0 -16 Td\n", pdf_escape(text)));
    }
    content.push_str("ET\n");

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}endstream",
            content.len(),
            content
        ),
    ];

    let mut out: Vec<u8> = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );
    out
}

fn pdf_escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}
