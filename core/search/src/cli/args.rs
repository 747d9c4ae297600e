use clap::builder::ArgAction;
use clap::value_parser;
use clap_complete::Shell;
use common::domain::{JobId, UserId};
use common::error::Error;
use serde_json::{json, Map, Value};
use std::path::PathBuf;

/// 全サブコマンド共通のオプション
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalOptions {
    /// --config: 設定ファイルのパス
    pub config: Option<PathBuf>,
    /// --fixture: HTTP ストアの代わりに読み込む JSON フィクスチャ
    pub fixture: Option<PathBuf>,
    /// -v / --verbose: デバッグログを stderr に出す
    pub verbose: bool,
}

/// search の入力
#[derive(Debug, Clone, PartialEq)]
pub enum SearchInput {
    /// 個別オプションから組み立てた生の検索条件
    Facets(Value),
    /// --query: ブックマーク URL のクエリ文字列
    Query(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search {
        input: SearchInput,
        user: Option<UserId>,
        json: bool,
    },
    Favorite {
        id: JobId,
        user: Option<UserId>,
        /// 省略時はストアから現在値を取得する
        current: Option<bool>,
    },
    Repl {
        user: Option<UserId>,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Search { .. } => "search",
            Self::Favorite { .. } => "favorite",
            Self::Repl { .. } => "repl",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub global: GlobalOptions,
    pub command: Command,
}

/// 解析結果: 通常の実行 / 補完スクリプト生成
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Run(Invocation),
    GenerateCompletion(Shell),
}

fn user_arg() -> clap::Arg {
    clap::Arg::new("user")
        .short('u')
        .long("user")
        .value_name("user-id")
        .help("Logged-in user id (favorites are disabled when omitted)")
        .num_args(1)
}

fn multi(name: &'static str, long: &'static str, value_name: &'static str, help: &'static str) -> clap::Arg {
    clap::Arg::new(name)
        .long(long)
        .value_name(value_name)
        .help(help)
        .action(ArgAction::Append)
}

fn search_command() -> clap::Command {
    clap::Command::new("search")
        .about("Search jobs by keyword and facets")
        .arg(
            clap::Arg::new("keyword")
                .short('k')
                .long("keyword")
                .value_name("text")
                .help("Match title or description (case-insensitive)")
                .num_args(1),
        )
        .arg(multi("location", "location", "prefecture", "Work location (repeatable)"))
        .arg(
            clap::Arg::new("salary-min")
                .long("salary-min")
                .value_name("万円")
                .help("Minimum annual salary floor in 10k yen (e.g. 500)")
                .num_args(1),
        )
        .arg(multi("industry", "industry", "industry", "Industry (repeatable)"))
        .arg(multi("job-type", "job-type", "type", "Job type (repeatable)"))
        .arg(multi("appeal", "appeal", "point", "Appeal point (repeatable)"))
        .arg(
            clap::Arg::new("page")
                .short('p')
                .long("page")
                .value_name("n")
                .help("Page number (1-based)")
                .value_parser(value_parser!(i64))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("limit")
                .short('l')
                .long("limit")
                .value_name("n")
                .help("Items per page (1..=50)")
                .value_parser(value_parser!(i64))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("query")
                .short('q')
                .long("query")
                .value_name("query-string")
                .help("Bookmark query string, e.g. '?keyword=engineer&page=2'")
                .num_args(1)
                .conflicts_with_all([
                    "keyword",
                    "location",
                    "salary-min",
                    "industry",
                    "job-type",
                    "appeal",
                    "page",
                    "limit",
                ]),
        )
        .arg(user_arg())
        .arg(
            clap::Arg::new("json")
                .long("json")
                .help("Print the outcome as JSON")
                .action(ArgAction::SetTrue),
        )
}

fn favorite_command() -> clap::Command {
    clap::Command::new("favorite")
        .about("Toggle the favorite flag of a job")
        .arg(
            clap::Arg::new("job-id")
                .index(1)
                .required(true)
                .help("Job id to toggle"),
        )
        .arg(user_arg())
        .arg(
            clap::Arg::new("current")
                .long("current")
                .value_name("bool")
                .help("Current value as displayed (fetched from the store when omitted)")
                .value_parser(value_parser!(bool))
                .num_args(1),
        )
}

fn repl_command() -> clap::Command {
    clap::Command::new("repl")
        .about("Read bookmark query strings or `fav <id>` lines from stdin")
        .arg(user_arg())
}

pub fn build_clap_command() -> clap::Command {
    clap::Command::new("jobsearch")
        .about("Faceted job search with cached pagination and favorites")
        .arg(
            clap::Arg::new("config")
                .short('c')
                .long("config")
                .value_name("path")
                .help("Config file (default: $JOBSEARCH_HOME/config.json)")
                .value_parser(value_parser!(PathBuf))
                .num_args(1)
                .global(true),
        )
        .arg(
            clap::Arg::new("fixture")
                .long("fixture")
                .value_name("jobs.json")
                .help("Use an in-memory store loaded from a JSON fixture")
                .value_parser(value_parser!(PathBuf))
                .num_args(1)
                .global(true),
        )
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Emit debug logs to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            clap::Arg::new("completion")
                .long("completion")
                .value_name("shell")
                .help("Generate shell completion script")
                .value_parser(value_parser!(Shell))
                .num_args(1),
        )
        .subcommand(search_command())
        .subcommand(favorite_command())
        .subcommand(repl_command())
}

fn strings(matches: &clap::ArgMatches, name: &str) -> Vec<String> {
    matches
        .get_many::<String>(name)
        .map(|i| i.cloned().collect())
        .unwrap_or_default()
}

fn user(matches: &clap::ArgMatches) -> Option<UserId> {
    matches
        .get_one::<String>("user")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(UserId::new)
}

/// 指定されたオプションだけを生の検索条件にする（正規化は usecase 側）
fn facets_to_raw(m: &clap::ArgMatches) -> Value {
    let mut raw = Map::new();
    if let Some(k) = m.get_one::<String>("keyword") {
        raw.insert("keyword".into(), json!(k));
    }
    for (arg, field) in [
        ("location", "location"),
        ("industry", "industries"),
        ("job-type", "jobTypes"),
        ("appeal", "appealPoints"),
    ] {
        let values = strings(m, arg);
        if !values.is_empty() {
            raw.insert(field.into(), json!(values));
        }
    }
    if let Some(s) = m.get_one::<String>("salary-min") {
        raw.insert("salaryMin".into(), json!(s));
    }
    if let Some(p) = m.get_one::<i64>("page") {
        raw.insert("page".into(), json!(p));
    }
    if let Some(l) = m.get_one::<i64>("limit") {
        raw.insert("limit".into(), json!(l));
    }
    Value::Object(raw)
}

fn matches_to_invocation(matches: &clap::ArgMatches) -> Result<Invocation, Error> {
    let global = GlobalOptions {
        config: matches.get_one::<PathBuf>("config").cloned(),
        fixture: matches.get_one::<PathBuf>("fixture").cloned(),
        verbose: matches.get_flag("verbose"),
    };
    let command = match matches.subcommand() {
        Some(("search", m)) => {
            let input = match m.get_one::<String>("query") {
                Some(q) => SearchInput::Query(q.clone()),
                None => SearchInput::Facets(facets_to_raw(m)),
            };
            Command::Search {
                input,
                user: user(m),
                json: m.get_flag("json"),
            }
        }
        Some(("favorite", m)) => Command::Favorite {
            id: JobId::new(
                m.get_one::<String>("job-id")
                    .cloned()
                    .unwrap_or_default(),
            ),
            user: user(m),
            current: m.get_one::<bool>("current").copied(),
        },
        Some(("repl", m)) => Command::Repl { user: user(m) },
        _ => {
            return Err(Error::invalid_argument(
                "a subcommand is required: search, favorite or repl",
            ))
        }
    };
    Ok(Invocation { global, command })
}

fn parse_matches(matches: clap::ArgMatches) -> Result<ParseOutcome, Error> {
    if let Some(&shell) = matches.get_one::<Shell>("completion") {
        return Ok(ParseOutcome::GenerateCompletion(shell));
    }
    matches_to_invocation(&matches).map(ParseOutcome::Run)
}

/// コマンドラインを解析する。--help / --version は clap の表示のまま終了させる。
pub fn parse_args() -> Result<ParseOutcome, Error> {
    let matches = build_clap_command().try_get_matches().map_err(|e| match e.kind() {
        clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => e.exit(),
        _ => Error::invalid_argument(e.to_string()),
    })?;
    parse_matches(matches)
}

/// テスト用: 引数スライスから解析する
pub fn parse_args_from(args: &[&str]) -> Result<ParseOutcome, Error> {
    let matches = build_clap_command()
        .try_get_matches_from(args)
        .map_err(|e| Error::invalid_argument(e.to_string()))?;
    parse_matches(matches)
}

/// 補完スクリプトを標準出力に出力する
pub fn print_completion(shell: Shell) {
    let mut cmd = build_clap_command();
    clap_complete::generate(shell, &mut cmd, "jobsearch", &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&str]) -> Invocation {
        match parse_args_from(args).unwrap() {
            ParseOutcome::Run(inv) => inv,
            ParseOutcome::GenerateCompletion(_) => panic!("expected Run"),
        }
    }

    #[test]
    fn test_parse_search_facets() {
        let inv = run(&[
            "jobsearch",
            "search",
            "-k",
            "engineer",
            "--industry",
            "IT",
            "--industry",
            "金融",
            "--salary-min",
            "500万円",
            "--page",
            "2",
        ]);
        assert_eq!(
            inv.command,
            Command::Search {
                input: SearchInput::Facets(json!({
                    "keyword": "engineer",
                    "industries": ["IT", "金融"],
                    "salaryMin": "500万円",
                    "page": 2,
                })),
                user: None,
                json: false,
            }
        );
    }

    #[test]
    fn test_parse_search_query_and_global_options() {
        let inv = run(&[
            "jobsearch",
            "search",
            "--query",
            "?keyword=web",
            "--fixture",
            "jobs.json",
            "-v",
            "--user",
            "u1",
            "--json",
        ]);
        assert_eq!(inv.global.fixture, Some(PathBuf::from("jobs.json")));
        assert!(inv.global.verbose);
        assert_eq!(
            inv.command,
            Command::Search {
                input: SearchInput::Query("?keyword=web".to_string()),
                user: Some(UserId::new("u1")),
                json: true,
            }
        );
    }

    #[test]
    fn test_query_conflicts_with_facets() {
        let err = parse_args_from(&["jobsearch", "search", "-q", "?page=2", "-k", "x"]).unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn test_query_conflicts_with_limit() {
        let err = parse_args_from(&["jobsearch", "search", "-q", "?keyword=x", "--limit", "30"]).unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn test_parse_favorite() {
        let inv = run(&["jobsearch", "favorite", "job-1", "-u", "u1", "--current", "true"]);
        assert_eq!(
            inv.command,
            Command::Favorite {
                id: JobId::new("job-1"),
                user: Some(UserId::new("u1")),
                current: Some(true),
            }
        );
        assert_eq!(inv.command.name(), "favorite");
    }

    #[test]
    fn test_blank_user_is_anonymous() {
        let inv = run(&["jobsearch", "repl", "--user", "  "]);
        assert_eq!(inv.command, Command::Repl { user: None });
    }

    #[test]
    fn test_missing_subcommand_is_usage_error() {
        let err = parse_args_from(&["jobsearch"]).unwrap_err();
        assert_eq!(err.exit_code(), 64);
    }

    #[test]
    fn test_completion() {
        assert!(matches!(
            parse_args_from(&["jobsearch", "--completion", "bash"]).unwrap(),
            ParseOutcome::GenerateCompletion(Shell::Bash)
        ));
    }

    #[test]
    fn test_unknown_option() {
        assert!(parse_args_from(&["jobsearch", "search", "--nope"]).is_err());
    }
}
