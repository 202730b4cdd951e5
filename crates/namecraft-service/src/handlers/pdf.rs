//! Name certificate download handler.

use std::fmt::Write as _;
use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Deserialize;

use namecraft_core::{CreditOperation, NameData, PDF_CERTIFICATE_COST};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;
use crate::upstream::PdfError;

/// Who the certificate is issued to.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateHolder {
    /// English name.
    pub english_name: Option<String>,
    /// Birth year, shown when given.
    pub birth_year: Option<serde_json::Value>,
    /// Gender as entered.
    pub gender: Option<String>,
}

/// Certificate request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfRequest {
    /// The name to certify.
    pub name_data: NameData,
    /// The holder.
    #[serde(default)]
    pub user_data: CertificateHolder,
}

/// Render a certificate for a name and charge one credit for it.
pub async fn download_certificate(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiJson(body): ApiJson<PdfRequest>,
) -> Result<Response, ApiError> {
    if !body.name_data.is_complete() {
        return Err(ApiError::BadRequest(
            "nameData needs chinese, pinyin and characters".into(),
        ));
    }

    let renderer = state
        .pdf
        .as_ref()
        .ok_or_else(|| ApiError::UpstreamUnavailable("PDF rendering is not configured".into()))?;

    let customer = state
        .store
        .ensure_customer(&auth.user_id, auth.email.as_deref())
        .await?;
    if !customer.has_sufficient_credits(PDF_CERTIFICATE_COST) {
        return Err(ApiError::InsufficientCredits {
            balance: customer.credits,
            required: PDF_CERTIFICATE_COST,
        });
    }

    let html = certificate_html(&body.name_data, &body.user_data);
    let document = renderer.render(&html).await.map_err(|e| {
        tracing::warn!(user_id = %auth.user_id, error = %e, "Certificate rendering failed");
        match e {
            PdfError::Timeout => ApiError::UpstreamTimeout("PDF rendering timed out".into()),
            PdfError::Api { .. } | PdfError::EmptyDocument => {
                ApiError::ExternalService("PDF rendering failed".into())
            }
            PdfError::Http(err) => ApiError::Internal(err.to_string()),
        }
    })?;

    // Charged only once the document exists.
    let tx = state
        .store
        .debit(
            &auth.user_id,
            PDF_CERTIFICATE_COST,
            CreditOperation::PdfCertificate,
            &format!("Name certificate for {}", body.name_data.chinese),
            serde_json::json!({ "chinese": body.name_data.chinese }),
        )
        .await?;

    tracing::info!(
        user_id = %auth.user_id,
        transaction_id = %tx.id,
        bytes = document.len(),
        "Certificate issued"
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"chinese-name-certificate.pdf\"",
            ),
        ],
        document,
    )
        .into_response())
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

/// Certificate document handed to the renderer. Every caller-supplied value
/// is HTML-escaped.
#[must_use]
pub fn certificate_html(name: &NameData, holder: &CertificateHolder) -> String {
    let mut characters = String::new();
    for c in &name.characters {
        let _ = write!(
            characters,
            r#"<div class="char"><div class="glyph">{}</div><div class="py">{}</div><div class="gloss">{}</div><p>{}</p></div>"#,
            escape_html(&c.character),
            escape_html(&c.pinyin),
            escape_html(&c.meaning),
            escape_html(&c.explanation),
        );
    }

    let holder_name = holder
        .english_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map_or_else(String::new, |n| {
            format!(r#"<p class="holder">Presented to {}</p>"#, escape_html(n))
        });

    let birth_year = match &holder.birth_year {
        Some(serde_json::Value::Number(n)) => format!(r#"<p class="meta">Born {n}</p>"#),
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {
            format!(r#"<p class="meta">Born {}</p>"#, escape_html(s.trim()))
        }
        _ => String::new(),
    };

    let gender = holder
        .gender
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map_or_else(String::new, |g| {
            format!(r#"<p class="meta">Gender: {}</p>"#, escape_html(g))
        });

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Chinese Name Certificate</title>
<style>
body {{ font-family: "Noto Serif SC", serif; margin: 48px; color: #2b2b2b; }}
.frame {{ border: 6px double #b8860b; padding: 40px; text-align: center; }}
.chinese {{ font-size: 72px; letter-spacing: 12px; margin: 16px 0; }}
.pinyin {{ font-size: 24px; color: #8b0000; }}
.chars {{ display: flex; justify-content: center; gap: 24px; margin: 32px 0; }}
.char {{ width: 160px; }}
.glyph {{ font-size: 40px; }}
.py, .gloss {{ font-size: 14px; }}
.meta, .issued {{ font-size: 12px; color: #666; }}
</style>
</head>
<body>
<div class="frame">
<h1>Chinese Name Certificate</h1>
{holder_name}{birth_year}{gender}
<div class="chinese">{chinese}</div>
<div class="pinyin">{pinyin}</div>
<div class="chars">{characters}</div>
<h2>Meaning</h2>
<p>{meaning}</p>
<h2>Cultural Notes</h2>
<p>{cultural_notes}</p>
<p class="issued">Issued {issued}</p>
</div>
</body>
</html>"#,
        chinese = escape_html(&name.chinese),
        pinyin = escape_html(&name.pinyin),
        meaning = escape_html(&name.meaning),
        cultural_notes = escape_html(&name.cultural_notes),
        issued = Utc::now().format("%Y-%m-%d"),
    )
}
