use ex33_core::{CodeStats, Ex33Error, Extraction};
use std::env;
use std::fs;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: ex33-scan <snippet.html>...");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  ex33-scan index.html");
        eprintln!("  ex33-scan *.html");
        process::exit(1);
    }

    let mut exit_code = 0;
    let files: Vec<_> = args[1..].to_vec();

    for file_path in files {
        match scan_file(&file_path) {
            Ok((extraction, stats)) => print_report(&file_path, &extraction, &stats),
            Err(e) => {
                eprintln!("✗ {}: {}", file_path, e);
                exit_code = 1;
            }
        }
    }

    process::exit(exit_code);
}

fn scan_file(path: &str) -> Result<(Extraction, CodeStats), Ex33Error> {
    let content = fs::read_to_string(path)
        .map_err(|e| Ex33Error::Io(format!("Failed to read file: {}", e)))?;
    Ok((Extraction::from_text(&content), CodeStats::from_text(&content)))
}

fn print_report(path: &str, extraction: &Extraction, stats: &CodeStats) {
    println!(
        "{} — {} chars, {} words, {} lines, {} KB",
        path, stats.chars, stats.words, stats.lines, stats.size_kb
    );
    print_list("media", &extraction.media);
    print_list("emoji", &extraction.emoji);
    print_list("colors", &extraction.colors);
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        println!("  {}: none", title);
        return;
    }
    println!("  {} ({}):", title, items.len());
    for item in items {
        println!("    {}", item);
    }
}
