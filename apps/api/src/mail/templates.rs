use crate::mail::OutgoingEmail;
use crate::tokens::TOKEN_TTL_HOURS;

pub const INVITATION_SUBJECT: &str = "Profile Information Request";

/// Optional personalisation supplied by the operator who sends the link.
#[derive(Debug, Default)]
pub struct InvitationContext<'a> {
    pub sender_name: Option<&'a str>,
    pub message: Option<&'a str>,
}

/// Builds the email that carries a recipient's profile link.
pub fn invitation_email(to: &str, link: &str, ctx: &InvitationContext<'_>) -> OutgoingEmail {
    let sender_name = ctx.sender_name.map(str::trim).filter(|s| !s.is_empty());
    let message = ctx.message.map(str::trim).filter(|s| !s.is_empty());

    let mut html = String::from(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">"#,
    );
    html.push_str("\n  <h2>Profile Information Request</h2>\n");
    if let Some(name) = sender_name {
        html.push_str(&format!(
            "  <p><strong>From:</strong> {}</p>\n",
            escape_html(name)
        ));
    }
    if let Some(msg) = message {
        html.push_str(&format!(
            "  <p><strong>Message:</strong> {}</p>\n",
            escape_html(msg)
        ));
    }
    html.push_str("  <p>Please use the link below to share your profile details:</p>\n");
    html.push_str(&format!(
        r#"  <a href="{href}" style="display: inline-block; padding: 12px 24px; background-color: #007bff; color: white; text-decoration: none; border-radius: 4px; margin: 16px 0;">Complete Your Profile</a>"#,
        href = escape_html(link)
    ));
    html.push_str(&format!(
        "\n  <p><strong>Note:</strong> This link will expire in {TOKEN_TTL_HOURS} hours.</p>\n</div>\n"
    ));

    let mut text = String::from("Profile Information Request\n\n");
    if let Some(name) = sender_name {
        text.push_str(&format!("From: {name}\n"));
    }
    if let Some(msg) = message {
        text.push_str(&format!("Message: {msg}\n"));
    }
    text.push_str(&format!(
        "\nComplete your profile here: {link}\n\nThis link will expire in {TOKEN_TTL_HOURS} hours.\n"
    ));

    OutgoingEmail {
        to: to.to_string(),
        subject: INVITATION_SUBJECT.to_string(),
        html,
        text,
    }
}

pub fn escape_html(raw: &str) -> String {
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

#[cfg(test)]
mod tests {
    use super::*;

    const LINK: &str = "https://profiles.example.com/profile/abc-123";

    #[test]
    fn test_invitation_contains_link_and_expiry() {
        let email = invitation_email("fay@example.com", LINK, &InvitationContext::default());
        assert_eq!(email.to, "fay@example.com");
        assert_eq!(email.subject, INVITATION_SUBJECT);
        assert!(email.html.contains(LINK));
        assert!(email.text.contains(LINK));
        assert!(email.html.contains("expire in 24 hours"));
        assert!(!email.html.contains("From:"));
    }

    #[test]
    fn test_invitation_includes_sender_and_message() {
        let ctx = InvitationContext {
            sender_name: Some("Gus"),
            message: Some("Thanks for joining"),
        };
        let email = invitation_email("fay@example.com", LINK, &ctx);
        assert!(email.html.contains("<strong>From:</strong> Gus"));
        assert!(email.text.contains("Message: Thanks for joining"));
    }

    #[test]
    fn test_blank_optional_fields_are_skipped() {
        let ctx = InvitationContext {
            sender_name: Some("   "),
            message: Some(""),
        };
        let email = invitation_email("fay@example.com", LINK, &ctx);
        assert!(!email.html.contains("From:"));
        assert!(!email.html.contains("Message:"));
    }

    #[test]
    fn test_user_supplied_html_is_escaped() {
        let ctx = InvitationContext {
            sender_name: Some("<script>alert(1)</script>"),
            message: Some("Tom & \"Jerry\""),
        };
        let email = invitation_email("fay@example.com", LINK, &ctx);
        assert!(!email.html.contains("<script>"));
        assert!(email.html.contains("&lt;script&gt;"));
        assert!(email.html.contains("Tom &amp; &quot;Jerry&quot;"));
    }
}
