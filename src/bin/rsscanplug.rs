//! rsscanplug 命令行入口
//! encode：对URL路径与表单请求体做全角编码
//! grep：以用户自定义正则并行扫描本地HTML文件，输出JSON格式的发现
//!
//! 运行命令：
//! cargo run --features cli -- encode "http://www.example.com/hola-mundo"
//! cargo run --features cli -- grep --regex "api[_-]?key" page1.html page2.html

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use env_logger::{Builder, Env, Target};
use http::Method;
use serde_json::to_string_pretty;
use url::Url;

use rsscanplug::grep::user_defined_regex::{OPT_REGEX_FILE_PATH, OPT_SINGLE_REGEX};
use rsscanplug::{
    EvasionPlugin, FullWidthEncode, GrepPlugin, HttpRequest, HttpResponse, KnowledgeBase,
    OptionValue, PluginKind, ScanProfile, UserDefinedRegex,
};

#[derive(Parser, Debug)]
#[command(name = "rsscanplug")]
#[command(author, version, about = "Full width request encoding and user defined regex grep", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RSSCANPLUG_LOG")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Full width encode a request path (and a url-encoded form body)
    Encode {
        /// Target URL
        url: String,

        /// Request body; sends the request as POST when set
        #[arg(short, long)]
        data: Option<String>,
    },
    /// Grep local HTML files for user defined regular expressions
    Grep {
        /// Single regular expression
        #[arg(short, long)]
        regex: Option<String>,

        /// File with one regular expression per line
        #[arg(short = 'f', long)]
        regex_file: Option<PathBuf>,

        /// JSON scan profile with plugin option overrides
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// URL reported for every file (defaults to the file:// URL of each file)
        #[arg(short, long)]
        url: Option<String>,

        /// HTML files to scan
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ========== 日志系统初始化 ==========
    Builder::from_env(Env::default().default_filter_or(cli.log_level.as_str()))
        .target(Target::Stderr)
        .init();

    match cli.command {
        Command::Encode { url, data } => encode(&url, data),
        Command::Grep {
            regex,
            regex_file,
            profile,
            url,
            files,
        } => grep(regex, regex_file, profile, url, &files),
    }
}

fn encode(url: &str, data: Option<String>) -> Result<()> {
    let mut request = HttpRequest::parse(url).with_context(|| format!("invalid URL: {}", url))?;
    if let Some(body) = data {
        request = request.with_method(Method::POST).with_body(body);
    }

    let mutated = FullWidthEncode::new().mutate_request(&request);
    println!("{}", mutated.url());
    if mutated.has_body() {
        println!("{}", String::from_utf8_lossy(mutated.body()));
    }
    Ok(())
}

fn grep(
    regex: Option<String>,
    regex_file: Option<PathBuf>,
    profile: Option<PathBuf>,
    url: Option<String>,
    files: &[PathBuf],
) -> Result<()> {
    let kb = Arc::new(KnowledgeBase::new());
    let mut plugin = PluginKind::Grep(Box::new(UserDefinedRegex::new(kb.clone())));

    if let Some(path) = profile {
        ScanProfile::from_file(&path)
            .and_then(|p| p.apply(&mut plugin))
            .with_context(|| format!("failed to apply profile {}", path.display()))?;
    }

    // 命令行参数优先于配置档
    if regex.is_some() || regex_file.is_some() {
        let mut options = plugin.describe();
        if let Some(regex) = regex {
            options.set(OPT_SINGLE_REGEX, OptionValue::String(regex))?;
        }
        if let Some(path) = regex_file {
            options.set(
                OPT_REGEX_FILE_PATH,
                OptionValue::String(path.display().to_string()),
            )?;
        }
        plugin.configure(&options)?;
    }

    let grep = plugin
        .as_grep()
        .ok_or_else(|| anyhow!("{} is not a grep plugin", plugin.name()))?;
    let fixed_url = url.as_deref().map(Url::parse).transpose()?;

    let start = Instant::now();
    let results: Vec<Result<()>> = std::thread::scope(|s| {
        let handles: Vec<_> = files
            .iter()
            .enumerate()
            .map(|(id, path)| {
                let fixed_url = fixed_url.clone();
                s.spawn(move || scan_file(grep, id as u64, path, fixed_url))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|_| Err(anyhow!("scan thread panicked"))))
            .collect()
    });
    for result in results {
        if let Err(e) = result {
            log::warn!("Scan failed | Error: {:#}", e);
        }
    }

    grep.finalize();
    log::info!(
        "Grep finished | Files: {} | Findings: {} | Cost: {:.2}ms",
        files.len(),
        kb.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    println!("{}", to_string_pretty(&kb.all_findings())?);
    Ok(())
}

fn scan_file(grep: &dyn GrepPlugin, id: u64, path: &Path, fixed_url: Option<Url>) -> Result<()> {
    let body = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let url = match fixed_url {
        Some(url) => url,
        None => {
            let absolute = path
                .canonicalize()
                .with_context(|| format!("failed to resolve {}", path.display()))?;
            Url::from_file_path(&absolute)
                .map_err(|_| anyhow!("no file URL for {}", absolute.display()))?
        }
    };

    let request = HttpRequest::new(url.clone());
    let response = HttpResponse::html(id, url, String::from_utf8_lossy(&body).into_owned());
    grep.on_response(&request, &response);
    Ok(())
}
