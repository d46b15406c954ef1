//! Final email layout.

use super::reply::ManagerReply;

pub const SENDER: &str = "AI Solutions Corp Sales Team";

pub const SIGNATURE: &str = "Best regards,
AI Solutions Corp Team
Sales Department
Email: sales@aisolutions.corp
Phone: +1-555-AI-SOLUTIONS";

/// Renders `reply` as the email text returned to the caller.
pub fn compose_email(reply: &ManagerReply) -> String {
    format!(
        "To: {}\nFrom: {SENDER}\nSubject: {}\n\n{}\n\n{SIGNATURE}",
        reply.client_name.trim(),
        reply.response_subject.trim(),
        reply.response_body.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_fixed_header_and_signature() {
        let email = compose_email(&ManagerReply {
            client_name: "Sarah Jones".into(),
            response_subject: "Re: Demo".into(),
            response_body: "Happy to help.\n".into(),
        });

        assert_eq!(
            email,
            "To: Sarah Jones\n\
             From: AI Solutions Corp Sales Team\n\
             Subject: Re: Demo\n\
             \n\
             Happy to help.\n\
             \n\
             Best regards,\n\
             AI Solutions Corp Team\n\
             Sales Department\n\
             Email: sales@aisolutions.corp\n\
             Phone: +1-555-AI-SOLUTIONS"
        );
    }
}
