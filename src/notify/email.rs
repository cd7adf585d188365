// src/notify/email.rs
//! SMTP delivery of the daily question: HTML body plus the question image
//! inlined via a content-id reference.

use anyhow::{Context, Result};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, Message, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

use crate::config::EmailConfig;
use crate::latest::LatestQuestion;

const IMAGE_CID: &str = "question_image";

pub struct EmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailSender {
    pub fn from_config(cfg: &EmailConfig) -> Result<Self> {
        let creds = Credentials::new(cfg.sender.clone(), cfg.password.clone());
        // Implicit-TLS submission (SMTPS), the way the original connected.
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.smtp_server)
            .with_context(|| format!("invalid smtp server {}", cfg.smtp_server))?
            .port(cfg.smtp_port)
            .credentials(creds)
            .build();

        let from = cfg
            .sender
            .parse()
            .with_context(|| format!("invalid sender address {}", cfg.sender))?;
        let to = cfg
            .receiver
            .parse()
            .with_context(|| format!("invalid receiver address {}", cfg.receiver))?;

        Ok(Self { mailer, from, to })
    }

    pub async fn send_question(&self, latest: &LatestQuestion) -> Result<()> {
        let q = &latest.question;
        let subject = format!("B站每日一题 - {}", q.title);
        let html = render_html_body(&q.title, &q.display_time(), &q.body);

        let image_bytes = tokio::fs::read(&latest.image_path)
            .await
            .with_context(|| format!("reading image {}", latest.image_path.display()))?;
        let image_type = content_type_for(&latest.image_path);

        let body = MultiPart::related()
            .singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_HTML)
                    .body(html),
            )
            .singlepart(
                Attachment::new_inline(IMAGE_CID.to_string()).body(image_bytes, image_type),
            );

        let msg = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .multipart(body)
            .context("building question email")?;

        self.mailer
            .send(msg)
            .await
            .context("sending question email")?;
        tracing::info!(number = q.number, "sent daily question email");
        Ok(())
    }
}

fn render_html_body(title: &str, time: &str, text: &str) -> String {
    format!(
        "<html>\n<body>\n  <h2>{title} ({time})</h2>\n  <p><b>题目内容:</b></p>\n  <p>{text}</p>\n  <p><img src=\"cid:{IMAGE_CID}\" width=\"80%\"></p>\n</body>\n</html>\n"
    )
}

fn content_type_for(path: &std::path::Path) -> ContentType {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "image/jpeg",
    };
    ContentType::parse(mime).unwrap_or(ContentType::TEXT_PLAIN)
}
