//! Render a markdown file (or stdin) the way chat answers are rendered.

use std::error::Error;
use std::io::{self, Read};
use std::path::PathBuf;

use crate::cli::context::CliContext;
use crate::markdown::{prepare_for_render, render_markdown};

pub async fn run_render(
    ctx: &CliContext,
    file: Option<PathBuf>,
    repair_only: bool,
    no_repair: bool,
) -> Result<(), Box<dyn Error>> {
    let content = match file {
        Some(path) if path.as_os_str() != "-" => tokio::fs::read_to_string(&path).await?,
        _ => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    if repair_only {
        print!("{}", prepare_for_render(&content));
        return Ok(());
    }

    let mut config = ctx.render_config();
    if no_repair {
        config = config.without_repair();
    }
    let rendered = render_markdown(&content, &ctx.theme, config);
    ctx.print_lines(&rendered.lines)?;
    Ok(())
}
