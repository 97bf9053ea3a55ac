use camino::Utf8PathBuf;
use pest::Parser;
use std::fs;
use varitex::{LatexParser, RenderOptions, Rule, render_to_text};

/// Expressions rendered by `cargo xtask demo` when no file is given
const DEMO_CORPUS: &[&str] = &[
    r"\sqrt{x+1}",
    r"\sqrt[3]{x+y}",
    r"\frac{x+1}{y-2}",
    r"\binom{n}{k}",
    r"x_{i+1}",
    r"\alpha + \beta = \gamma",
    r"\pi \times \infty",
    r"\pm \sqrt{2}",
    r"\approx 3.14159",
    r"\equiv \text{equivalent}",
    r"\langle x \rangle",
    r"\ldots \text{ and so on}",
    r"\mathrm{e}^{i\pi}",
    r"\Gamma(\alpha) \cdot \Delta",
    r"\[Every \] $time$ \n\n\(it\)\n\n \boxed{wants} to answer?",
    r"\frac{3}{4} + \frac{1}{2} = \frac{5}{4}",
    r"\frac{x^2 + 1}{2\sqrt{x^2 + 1}}",
    r"\sqrt{x^2 + 1}",
    r"\sqrt[3]{x^3 + y^3}",
    r"\pi r^2",
    r"x \leq y \geq z",
    r"a \neq b \approx c",
    r"\infty \pm \times \div",
    r"\sum_{i=1}^{n} x_i",
    r"\int_{0}^{1} x dx",
    r"\int_{-\infty}^{\infty} e^{-x^2} dx",
    r"\sin(x) + \cos(y) + \tan(z)",
    r"\log_{10}(x) + \ln(y)",
    r"\lim_{x \to \infty} \frac{1}{x}",
    r"x \in \mathbb{R} \cap \mathbb{Q}",
    r"A \subset B \subseteq C",
    r"\emptyset \cup \{1,2,3\}",
    r"\frac{d}{dx}\left(\frac{x^2 + 1}{x - 1}\right)",
    r"\sum_{n=1}^{\infty} \frac{1}{n^2} = \frac{\pi^2}{6}",
    r"\int_0^1 \frac{x^n}{n!} dx = \frac{1}{(n+1)!}",
    r"The answer is \boxed{\frac{5}{4}}",
    r"x = \boxed{-2} or x = \boxed{-3}",
    r"\boxed{x = \boxed{5}} and y = \boxed{10}",
    r"\text{Hello} \mathrm{World}",
    r"\textbf{Bold} \textit{Italic}",
    r"a \quad b \qquad c",
    r"Line 1 \\ Line 2",
    r"\sqrt{\frac{a^2 + b^2}{c^2 + d^2}}",
    r"\sum_{i=1}^{n} \frac{x_i^2}{\sqrt{y_i}}",
    r"\int_{-\infty}^{\infty} \frac{e^{-x^2/2}}{\sqrt{2\pi}} dx",
    r"\frac{d[A]}{dt} = -k[A]^n",
    r"[A](t) = \frac{[A]_0}{1 + k[A]_0 t}",
    r"t_{1/2} = \frac{1}{k[A]_0}",
];

fn usage() -> ! {
    eprintln!("Usage: cargo xtask <command>");
    eprintln!("Commands:");
    eprintln!("  demo [--seed N] [--variations N] [FILE]   Render expressions several times");
    eprintln!("  parse-tree EXPR                           Print the grammar's parse tree");
    std::process::exit(1);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        usage();
    };

    match command.as_str() {
        "demo" => demo(&args[1..]),
        "parse-tree" => match args.get(1) {
            Some(expr) => parse_tree(expr),
            None => usage(),
        },
        _ => {
            eprintln!("Unknown command: {}", command);
            std::process::exit(1);
        }
    }
}

struct DemoArgs {
    seed: Option<u64>,
    variations: usize,
    file: Option<Utf8PathBuf>,
}

fn parse_demo_args(args: &[String]) -> DemoArgs {
    let mut demo = DemoArgs {
        seed: None,
        variations: 3,
        file: None,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--seed" => match iter.next().and_then(|n| n.parse().ok()) {
                Some(seed) => demo.seed = Some(seed),
                None => usage(),
            },
            "--variations" => match iter.next().and_then(|n| n.parse().ok()) {
                Some(count) => demo.variations = count,
                None => usage(),
            },
            path if !path.starts_with("--") => demo.file = Some(Utf8PathBuf::from(path)),
            _ => usage(),
        }
    }
    demo
}

fn demo(args: &[String]) {
    let args = parse_demo_args(args);

    let corpus: Vec<String> = match &args.file {
        Some(path) => match fs::read_to_string(path) {
            Ok(contents) => contents
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) => {
                eprintln!("Failed to read {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => DEMO_CORPUS.iter().map(|s| s.to_string()).collect(),
    };

    println!("LaTeX to text, {} variations each", args.variations);
    println!("{}", "=".repeat(50));

    for (i, latex) in corpus.iter().enumerate() {
        println!("\nExpression {}: {}", i + 1, latex);
        for j in 0..args.variations {
            let options = RenderOptions {
                seed: args.seed.map(|seed| seed.wrapping_add(j as u64)),
                ..RenderOptions::default()
            };
            match render_to_text(latex.as_str(), &options) {
                Ok(text) => println!("  {}: {}", j + 1, text),
                Err(e) => {
                    eprintln!("{:?}", miette::Report::new(e));
                    break;
                }
            }
        }
    }
}

fn parse_tree(expr: &str) {
    println!("Parsing: {}", expr);
    println!();

    match LatexParser::parse(Rule::document, expr) {
        Ok(pairs) => match pest_ascii_tree::into_ascii_tree(pairs) {
            Ok(tree) => println!("{}", tree),
            Err(e) => eprintln!("Failed to format tree: {}", e),
        },
        Err(e) => {
            eprintln!("Parse error: {}", e);
            std::process::exit(1);
        }
    }
}
