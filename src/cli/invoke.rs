use crate::core::progress;
use crate::tool::{ConversionExecutor, ToolDescriptor};
use anyhow::{Context, Result};
use serde_json::Value;
use tokio::io::AsyncReadExt;

/// Runs one framework-style invocation. Arguments come from `args` or, when
/// absent, from stdin. The tool response goes to stdout; progress
/// notifications are written to stderr as JSON lines.
pub async fn run(executor: &ConversionExecutor, args: Option<&str>) -> Result<()> {
    let raw = match args {
        Some(args) => args.to_string(),
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("Failed to read tool arguments from stdin")?;
            buf
        }
    };

    let args: Value =
        serde_json::from_str(&raw).context("Failed to parse tool arguments as JSON")?;

    let callback = progress::callback(|notification| {
        eprintln!("{}", serde_json::to_string(notification)?);
        Ok(())
    });

    println!("{}", executor.invoke(args, Some(callback)).await);
    Ok(())
}

/// Prints the registration descriptor of the tool.
pub fn schema() -> Result<()> {
    let descriptor = ToolDescriptor::currency_converter();
    println!("{}", serde_json::to_string_pretty(&descriptor)?);
    Ok(())
}
