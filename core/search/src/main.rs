use std::io::{self, BufRead, Write};
use std::process;

use common::adapter::StdEnvResolver;
use common::domain::{JobId, UserId};
use common::error::Error;
use common::ports::outbound::LogRecord;
use jobsearch::cli::render::{outcome_json, outcome_text, stats_text};
use jobsearch::cli::{parse_args, print_completion, Command, Invocation, ParseOutcome, SearchInput};
use jobsearch::domain::{FavoriteError, SearchOutcome};
use jobsearch::wiring::{wire_app, App, WireOptions};

/// Command をディスパッチする Runner（match は main レイヤーに集約）
struct Runner {
    app: App,
}

impl Runner {
    fn log(&self, record: LogRecord) {
        let _ = self.app.logger.log(&record.layer("cli"));
    }

    fn run(&self, command: Command) -> Result<i32, Error> {
        let command_name = command.name();
        self.log(
            LogRecord::info("command started")
                .kind("lifecycle")
                .field("command", command_name),
        );

        let result = match command {
            Command::Search { input, user, json } => self.search(input, user.as_ref(), json),
            Command::Favorite { id, user, current } => self.favorite(&id, user.as_ref(), current),
            Command::Repl { user } => self.repl(user.as_ref()),
        };

        let code = match &result {
            Ok(code) => *code,
            Err(e) => e.exit_code(),
        };
        self.log(
            LogRecord::info("command finished")
                .kind("lifecycle")
                .field("command", command_name)
                .field("exit_code", code),
        );
        if let Err(ref e) = result {
            self.log(LogRecord::error(e.to_string()).kind("error"));
        }
        result
    }

    /// 結果ページの行にお気に入り状態を重ねて表示する
    fn print_outcome(&self, outcome: &SearchOutcome, user: Option<&UserId>, json: bool) -> Result<(), Error> {
        let ids: Vec<JobId> = outcome.page.items.iter().map(|s| s.id.clone()).collect();
        if let Err(e) = self.app.favorites.fetch_status(&ids, user) {
            // 状態が取れなくても検索結果は表示する
            self.log(LogRecord::warn(e.to_string()).kind("favorite"));
        }
        let rows = self.app.favorites.overlay(&outcome.page);
        if json {
            println!("{}", outcome_json(outcome, &rows)?);
        } else {
            print!("{}", outcome_text(outcome, &rows));
        }
        Ok(())
    }

    fn search(&self, input: SearchInput, user: Option<&UserId>, json: bool) -> Result<i32, Error> {
        let outcome = match input {
            SearchInput::Facets(raw) => self.app.search.search_raw(&raw),
            SearchInput::Query(q) => self.app.search.search_query_string(&q),
        };
        self.print_outcome(&outcome, user, json)?;
        // 結果は表示済み。失敗は終了コードだけで伝える（74: 一時的, 78: 設定不備）
        Ok(match &outcome.error {
            None => 0,
            Some(failure) if failure.retryable => 74,
            Some(_) => 78,
        })
    }

    fn favorite(&self, id: &JobId, user: Option<&UserId>, current: Option<bool>) -> Result<i32, Error> {
        let current = match current {
            Some(v) => v,
            None => self
                .app
                .favorites
                .fetch_status(std::slice::from_ref(id), user)?
                .get(id)
                .copied()
                .unwrap_or(false),
        };
        let outcome = self.app.favorites.toggle(id, current, user)?;
        let mark = if outcome.value { "★" } else { "☆" };
        println!("{} {}", mark, outcome.id);
        Ok(0)
    }

    fn repl(&self, user: Option<&UserId>) -> Result<i32, Error> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        for line in stdin.lock().lines() {
            let line = line?;
            let line = line.trim();
            match line {
                "" => continue,
                ":q" | ":quit" => break,
                ":stats" => println!("{}", stats_text(&self.app.search.cache_stats())),
                _ => {
                    if let Some(id) = line.strip_prefix("fav ") {
                        let id = JobId::new(id.trim());
                        let current = self.app.favorites.is_favorite(&id);
                        match self.app.favorites.toggle(&id, current, user) {
                            Ok(t) => println!("{} {}", if t.value { "★" } else { "☆" }, t.id),
                            Err(e @ FavoriteError::CommitFailed { .. }) => {
                                println!("{}（表示を元に戻しました）", e)
                            }
                            Err(e) => println!("{}", e),
                        }
                    } else {
                        let outcome = self.app.search.search_query_string(line);
                        self.print_outcome(&outcome, user, false)?;
                    }
                }
            }
            stdout.flush()?;
        }
        Ok(0)
    }
}

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            if e.is_usage() {
                print_usage();
            }
            eprintln!("jobsearch: {}", e);
            e.exit_code()
        }
    };
    process::exit(exit_code);
}

fn run() -> Result<i32, Error> {
    let Invocation { global, command } = match parse_args()? {
        ParseOutcome::Run(inv) => inv,
        ParseOutcome::GenerateCompletion(shell) => {
            print_completion(shell);
            return Ok(0);
        }
    };
    let app = wire_app(
        WireOptions {
            config_path: global.config.as_deref(),
            fixture: global.fixture.as_deref(),
            verbose: global.verbose,
        },
        &StdEnvResolver,
    )?;
    Runner { app }.run(command)
}

fn print_usage() {
    eprintln!("Usage: jobsearch [--config <path>] [--fixture <jobs.json>] [-v] <search|favorite|repl> [options]");
}
