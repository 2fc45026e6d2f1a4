use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::errors::AppError;
use crate::mail::templates::escape_html;
use crate::state::AppState;
use crate::tokens::TokenStatus;

const INDEX_HTML: &str = include_str!("../../templates/index.html");
const PROFILE_FORM_HTML: &str = include_str!("../../templates/profile_form.html");

/// GET /
pub async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub fn render_profile_form(token: &str) -> String {
    PROFILE_FORM_HTML.replace("{{TOKEN}}", &escape_html(token))
}

/// GET /profile/:token
pub async fn profile_form_page(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, AppError> {
    Ok(match state.tokens.check(&token).await? {
        TokenStatus::Valid(_) => Html(render_profile_form(&token)).into_response(),
        TokenStatus::Expired => (StatusCode::GONE, "Profile link has expired").into_response(),
        TokenStatus::Unknown => {
            (StatusCode::NOT_FOUND, "Invalid or expired profile link").into_response()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_form_embeds_token() {
        let html = render_profile_form("abc-123");
        assert!(html.contains(r#"value="abc-123""#));
        assert!(!html.contains("{{TOKEN}}"));
    }

    #[test]
    fn test_profile_form_escapes_token() {
        let html = render_profile_form(r#""><b>"#);
        assert!(html.contains("&quot;&gt;&lt;b&gt;"));
        assert!(!html.contains(r#""><b>"#));
    }
}
