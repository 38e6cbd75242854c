//! Training loop that reports progress by e-mail and Discord
//!
//! Expects a `fenn.yaml` in the working directory:
//!
//! ```yaml
//! project: demo
//! logger:
//!   dir: logger
//! train:
//!   lr: 0.001
//!   epochs: 10
//! notification:
//!   subject: Training update
//! ```
//!
//! and `RESEND_API_KEY`, `RESEND_FROM_EMAIL`, `RESEND_TO_EMAILS` (and
//! optionally `DISCORD_WEBHOOK_URL`) in `.env` or the environment.

use fenn::notification::Resend;
use fenn::{App, AppError, ServiceKind};

fn main() {
    let result = App::new().run(|ctx| {
        let lr = ctx.config().get("train/lr").and_then(|v| v.as_f64()).unwrap_or(1e-3);
        let epochs = ctx
            .config()
            .get("train/epochs")
            .and_then(|v| v.as_u64())
            .unwrap_or(10);
        let subject = ctx
            .config()
            .get("notification/subject")
            .and_then(|v| v.as_str())
            .unwrap_or(Resend::DEFAULT_SUBJECT)
            .to_string();

        ctx.println(format!("Training with learning rate: {}", lr))?;

        let mut notifier = ctx.notifier();
        notifier.add(ServiceKind::Resend {
            subject: Some(subject),
        })?;
        if let Err(e) = notifier.add(ServiceKind::Discord) {
            ctx.output().system_warning(&format!("Discord disabled: {}", e))?;
        }

        let started = format!("Training started with lr={}, epochs={}", lr, epochs);
        report(ctx, notifier.notify(&started))?;

        for epoch in 1..=epochs {
            ctx.println(format!("Epoch {}/{}", epoch, epochs))?;
            ctx.log_metrics(Some(epoch), &[("loss", 1.0 / epoch as f64)])?;

            if epoch % 5 == 0 {
                let progress = format!("Training progress: Epoch {}/{} completed", epoch, epochs);
                report(ctx, notifier.notify(&progress))?;
            }
        }

        report(ctx, notifier.notify(&format!("Training completed! Total epochs: {}", epochs)))?;
        Ok::<_, AppError>(())
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn report(ctx: &fenn::Context<'_>, report: fenn::notification::DeliveryReport) -> fenn::Result<()> {
    for (service, detail) in report.failed() {
        ctx.output()
            .system_warning(&format!("{} notification failed: {}", service, detail))?;
    }
    Ok(())
}
