use super::ui;
use crate::core::conversion::{ConversionRequest, ConversionResult, ToolResponse};
use crate::core::progress::{self, Notification};
use crate::tool::ConversionExecutor;
use anyhow::Result;
use futures::future::join_all;
use indicatif::ProgressBar;

/// Converts `amount` from `from` into every currency in `targets`.
///
/// Each target is an independent tool invocation; they run concurrently and
/// are reported in argument order.
pub async fn run(
    executor: &ConversionExecutor,
    amount: f64,
    from: &str,
    targets: &[String],
    json: bool,
) -> Result<()> {
    let pb = if json {
        ProgressBar::hidden()
    } else {
        ui::new_progress_bar()
    };

    let tasks = targets.iter().map(|to| {
        let bar = pb.clone();
        let callback = progress::callback(move |notification| {
            let Notification::Progress(update) = notification;
            bar.set_message(update.message.clone());
            bar.set_position(u64::from(update.progress));
            Ok(())
        });
        executor.respond(ConversionRequest::new(amount, from, to).with_progress(callback))
    });
    let responses = join_all(tasks).await;
    pb.finish_and_clear();

    let mut failures = 0;
    for (to, response) in targets.iter().zip(&responses) {
        if response.is_error() {
            failures += 1;
        }
        if json {
            println!("{}", response.to_json());
        } else {
            println!("{}", display_response(to, response));
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} conversions failed", targets.len());
    }
    Ok(())
}

pub fn display_response(to: &str, response: &ToolResponse) -> String {
    match response {
        ToolResponse::Data(result) => display_result(result),
        ToolResponse::Error(body) => {
            let mut output = format!(
                "{}: {}",
                ui::style_text(to, ui::StyleType::Title),
                ui::style_text(&body.message, ui::StyleType::Error)
            );
            if let Some(details) = &body.details {
                output.push_str(&format!(
                    "\n  {}",
                    ui::style_text(&details.to_string(), ui::StyleType::Subtle)
                ));
            }
            output
        }
    }
}

fn display_result(result: &ConversionResult) -> String {
    let updated = result.last_updated.as_deref().unwrap_or("N/A");
    format!(
        "{}\n  {}",
        ui::style_text(&result.equivalent_string, ui::StyleType::Value),
        ui::style_text(
            &format!(
                "rate {} | provider {} | updated {}",
                result.rate, result.provider, updated
            ),
            ui::StyleType::Subtle
        )
    )
}
