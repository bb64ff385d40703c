//! Richtext CLI
//!
//! Lays out a markup string and prints the resulting lines, fragments and
//! link groups, or the whole layout as JSON.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use owo_colors::OwoColorize;
use richtext_layout::{
    Align, Fragment, FragmentKind, LineWrap, LinkTarget, RichText, RichTextLayout,
    RichTextOptions, Validation,
};
use richtext_markup::{parse, preprocess, print_tree};

/// Lay out richtext markup and inspect the result
#[derive(Parser, Debug)]
#[command(name = "richtext")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Lay out a file on one line
    richtext ./greeting.txt

    # Wrap inline markup at 120px and center it
    richtext --markup 'Hello <b>bold</b> world' --width 120 --align center

    # Dump the layout as JSON
    richtext --markup 'H<sub>2</sub>O' --json

    # Load options from a JSON file
    richtext --options style.json ./greeting.txt
"#)]
struct Cli {
    /// File holding the markup
    #[arg(value_name = "FILE", required_unless_present = "markup")]
    path: Option<PathBuf>,

    /// Markup given directly instead of a file
    #[arg(long, value_name = "MARKUP", conflicts_with = "path")]
    markup: Option<String>,

    /// JSON file with layout options
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Wrap lines at this many px
    #[arg(long)]
    width: Option<f32>,

    /// Line alignment: left, center or right
    #[arg(long)]
    align: Option<Align>,

    /// Extra space between lines in px
    #[arg(long)]
    leading: Option<f32>,

    /// Treat `\n` in the markup as a line break
    #[arg(long)]
    replace_newlines: bool,

    /// Skip invalid content instead of failing
    #[arg(long)]
    lenient: bool,

    /// Print the layout as JSON
    #[arg(long)]
    json: bool,

    /// Also print the parsed markup tree
    #[arg(long)]
    tree: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let markup = load_markup(&cli)?;
    let options = load_options(&cli)?;

    if cli.tree {
        println!("{}", "=== Markup Tree ===".bold());
        let prepared = preprocess(&markup, options.replace_newlines);
        let tree = parse(&prepared)?;
        print_tree(&tree, tree.root(), 0);
        println!();
    }

    let rich_text = RichText::new(markup, options)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(rich_text.layout())?);
    } else {
        print_layout(rich_text.layout(), rich_text.wrap_width());
    }
    Ok(())
}

/// Markup from `--markup` or the file argument
fn load_markup(cli: &Cli) -> anyhow::Result<String> {
    if let Some(ref markup) = cli.markup {
        Ok(markup.clone())
    } else if let Some(ref path) = cli.path {
        fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {e}", path.display()))
    } else {
        anyhow::bail!("either a FILE or --markup is required")
    }
}

/// Options from `--options`, then the individual flags on top
fn load_options(cli: &Cli) -> anyhow::Result<RichTextOptions> {
    let mut options = match cli.options {
        Some(ref path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => RichTextOptions::default(),
    };
    if let Some(width) = cli.width {
        options.line_wrap = LineWrap::Fixed(width);
    }
    if let Some(align) = cli.align {
        options.align = align;
    }
    if let Some(leading) = cli.leading {
        options.leading = leading;
    }
    if cli.replace_newlines {
        options.replace_newlines = true;
    }
    if cli.lenient {
        options.validation = Validation::Lenient;
    }
    Ok(options)
}

/// Print every line with its fragments, then the link groups
fn print_layout(layout: &RichTextLayout, wrap_width: f32) {
    println!(
        "{}",
        format!("=== Layout ({} lines, wrap width {wrap_width}) ===", layout.lines.len()).bold()
    );
    if let Some(bounds) = layout.bounds() {
        println!(
            "bounds: x={:.1} y={:.1} w={:.1} h={:.1}",
            bounds.x, bounds.y, bounds.width, bounds.height
        );
    }
    if let Some(minimum) = layout.minimum_width {
        println!("minimum width: {minimum:.1}");
    }

    for (index, line) in layout.lines.iter().enumerate() {
        println!();
        println!(
            "{} baseline x={:.1} y={:.1}",
            format!("[line {index}]").cyan(),
            line.transform.x,
            line.transform.y
        );
        if let Some(bounds) = layout.line_bounds(index) {
            println!(
                "  bounds: x={:.1} y={:.1} w={:.1} h={:.1}",
                bounds.x, bounds.y, bounds.width, bounds.height
            );
        }
        for fragment in line.fragments() {
            print_fragment(fragment, 1);
        }
    }

    if !layout.links.is_empty() {
        println!();
        println!("{}", "=== Links ===".bold());
        for (index, group) in layout.links.iter().enumerate() {
            let target = match &group.href {
                LinkTarget::Url(url) => url.clone(),
                LinkTarget::Callback(_) => "<callback>".to_string(),
            };
            println!(
                "{} \"{}\" -> {target} ({} fragments)",
                format!("[link {index}]").cyan(),
                group.label,
                group.members.len()
            );
            for member in &group.members {
                println!("  on line {}:", member.line);
                print_fragment(&member.fragment, 2);
            }
        }
    }
}

/// Recursively print a fragment with its offset
fn print_fragment(fragment: &Fragment, depth: usize) {
    let indent = "  ".repeat(depth);
    let position = format!(
        "x={:.1} y={:.1}",
        fragment.transform.x, fragment.transform.y
    );
    match &fragment.kind {
        FragmentKind::Text(leaf) => {
            let preview = leaf.text.replace(' ', "\u{00B7}");
            println!(
                "{indent}Text(\"{preview}\") {position} w={:.1} fill={} font=\"{}\"",
                leaf.width, leaf.fill, leaf.font
            );
        }
        FragmentKind::Container(container) => {
            let scale = if (fragment.transform.scale - 1.0).abs() > f32::EPSILON {
                format!(" scale={:.2}", fragment.transform.scale)
            } else {
                String::new()
            };
            println!("{indent}Group {position}{scale} dir={}", container.direction);
            for child in &container.children {
                print_fragment(child, depth + 1);
            }
        }
        FragmentKind::Embed(embed) => {
            println!(
                "{indent}Embed(\"{}\") {position} w={:.1} h={:.1}",
                embed.id, embed.bounds.width, embed.bounds.height
            );
        }
        FragmentKind::Rule(rule) => {
            println!(
                "{indent}Rule x1={:.1} x2={:.1} y={:.1} thickness={:.1}",
                rule.x1, rule.x2, rule.y, rule.thickness
            );
        }
        FragmentKind::LinkSlot(slot) => {
            println!(
                "{indent}{}",
                format!("-> link {} fragment {}", slot.group, slot.member).dimmed()
            );
        }
    }
}
