use anyhow::{Context, Result, bail};
use sumi_config::SumiConfig;
use sumi_render::{Renderer, RendererOptions, Severity, StyleSpec};

const USAGE: &str = "usage: sumi <style.json> <text|@file> <out.png>";

fn main() -> Result<()> {
    let _ = env_logger::try_init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [style_path, text, out_path] = args.as_slice() else {
        bail!(USAGE);
    };

    let config = SumiConfig::load();
    log::debug!("config: {config:?}");

    let raw = std::fs::read_to_string(style_path)
        .with_context(|| format!("failed to read style record {style_path}"))?;
    let style: StyleSpec = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse style record {style_path}"))?;

    let content = match text.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read text from {path}"))?,
        None => text.clone(),
    };

    let mut renderer = Renderer::new(RendererOptions::from_config(&config));
    let output = renderer
        .render(&style, &content)
        .context("render failed")?;
    for diagnostic in &output.diagnostics {
        match diagnostic.severity {
            Severity::Info => log::info!("{}", diagnostic.message),
            Severity::Warning => log::warn!("{}", diagnostic.message),
        }
    }

    let png = output.encode_png()?;
    std::fs::write(out_path, png).with_context(|| format!("failed to write {out_path}"))?;
    log::info!("wrote {}x{} image to {out_path}", output.width, output.height);
    Ok(())
}
