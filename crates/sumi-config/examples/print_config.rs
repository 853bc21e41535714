/// Print the effective configuration
///
/// Run with: cargo run -p sumi-config --example print_config

fn main() {
    let config = sumi_config::SumiConfig::load();

    println!("=== Sumi Configuration ===\n");

    println!("Fonts:");
    println!("  Default family: {}", config.fonts.default_family);
    println!("  Extra dirs: {:?}", config.fonts.extra_font_dirs);
    println!("  System fonts: {}", config.fonts.load_system_fonts);
    println!();

    println!("Caches:");
    println!("  Glyph: {}", config.cache.glyph_capacity);
    println!("  Blur: {}", config.cache.blur_capacity);
    println!("  Render: {}", config.cache.render_capacity);
    println!();

    println!("Limits:");
    println!("  Max canvas side: {}", config.limits.max_canvas_side);
}
