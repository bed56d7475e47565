use anyhow::{bail, Context};
use clap::Parser;
use jpath::document::Document;
use jpath::Path;
use std::io::stdin;

/// Select a value from a JSON document using a path expression.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Path expression, e.g. "$.user.locations[.name == 'Buenos Aires']"
    expression: String,

    /// JSON document to query, `-` reads from stdin
    #[clap(default_value = "-")]
    document: String,

    /// Pretty print the selected value
    #[clap(short, long)]
    pretty: bool,

    /// Print the compiled tokens as JSON instead of evaluating them
    #[clap(long)]
    tokens: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let path = compile(&args.expression)?;
    if args.tokens {
        println!("{}", serde_json::to_string_pretty(path.tokens())?);
        return Ok(());
    }

    let doc = if args.document == "-" {
        if atty::is(atty::Stream::Stdin) {
            usage();
            bail!("no JSON document supplied");
        }
        Document::from_reader(stdin().lock()).map_err(jpath::Error::from)?
    } else {
        Document::from_path(&args.document)
            .map_err(jpath::Error::from)
            .with_context(|| format!("failed to load {}", args.document))?
    };

    println!("{}", render(&path, &doc, args.pretty)?);
    Ok(())
}

/// Compiles the expression, tagging failures as syntax errors.
fn compile(expression: &str) -> jpath::Result<Path> {
    Ok(Path::parse(expression)?)
}

/// Evaluates the path, tagging failures as evaluation errors.
fn render(path: &Path, doc: &Document, pretty: bool) -> jpath::Result<String> {
    let selection = path.select(doc)?;
    if pretty {
        Ok(format!("{:#}", selection.to_value(doc)))
    } else {
        Ok(selection.serialize(doc))
    }
}

fn usage() {
    eprintln!("jpath <expression> <file>");
    eprintln!("or");
    eprintln!("echo '{{}}' | jpath <expression>");
}
