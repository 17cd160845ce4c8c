//! Send one message through Mandrill.
//!
//! ```text
//! MANDRILL_API_KEY=md-xxxx cargo run --example send -- jane@example.com [template-slug]
//! ```

use mandrill_delivery::{Configuration, DeliveryMethod, Mail};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), mandrill_delivery::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let to = args.next().unwrap_or_else(|| "jane@example.com".to_string());
    let template = args.next();

    let mut mail = Mail::builder()
        .from("Demo <demo@example.com>")
        .to(to)
        .subject("Hello from mandrill-delivery")
        .text("Plain text body")
        .html("<p>HTML body</p>")
        .tag("demo");
    if let Some(slug) = template {
        mail = mail
            .template(slug)
            .template_content("body", "<p>Template content</p>");
    }

    let mut delivery = DeliveryMethod::new(&Configuration::from_env()?);
    let response = delivery.deliver(&mail.build()?).await?;

    println!("{response:#}");
    Ok(())
}
