use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Ddl,
    Exec,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Ddl(DdlArgs),
    Exec(ExecArgs),
}

#[derive(Debug, Clone)]
pub struct DdlArgs {
    pub schema: PathBuf,
    pub dialect: String,
    pub if_not_exists: bool,
}

#[derive(Debug, Clone)]
pub struct ExecArgs {
    pub config: PathBuf,
    pub database: Option<String>,
    /// Statement text; read from stdin when empty.
    pub sql: String,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first.as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help(HelpTopic::Root)),
        "ddl" => parse_ddl(it.map(|s| s.as_str())),
        "exec" => parse_exec(it.map(|s| s.as_str())),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

fn parse_ddl<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut schema: Option<PathBuf> = None;
    let mut dialect = "mysql".to_string();
    let mut if_not_exists = false;

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Ddl)),
            "--dialect" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--dialect requires a value");
                };
                dialect = v.to_string();
            }
            _ if token.starts_with("--dialect=") => {
                dialect = token.trim_start_matches("--dialect=").to_string();
            }
            "--if-not-exists" => if_not_exists = true,
            other if other.starts_with('-') => anyhow::bail!("unknown argument: {other}"),
            path => {
                if schema.is_some() {
                    anyhow::bail!("ddl takes exactly one schema file");
                }
                schema = Some(PathBuf::from(path));
            }
        }
    }

    let Some(schema) = schema else {
        anyhow::bail!("ddl requires a schema file");
    };
    if dialect.trim().is_empty() {
        anyhow::bail!("--dialect must not be empty");
    }

    Ok(Command::Ddl(DdlArgs {
        schema,
        dialect,
        if_not_exists,
    }))
}

fn parse_exec<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut config = PathBuf::from("dbforge.toml");
    let mut database: Option<String> = None;
    let mut words: Vec<&str> = Vec::new();

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Exec)),
            "--config" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--config requires a value");
                };
                config = PathBuf::from(v);
            }
            _ if token.starts_with("--config=") => {
                config = PathBuf::from(token.trim_start_matches("--config="));
            }
            "--database" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--database requires a value");
                };
                database = Some(v.to_string());
            }
            _ if token.starts_with("--database=") => {
                database = Some(token.trim_start_matches("--database=").to_string());
            }
            // Everything after `--` is statement text.
            "--" => {
                words.extend(it.by_ref());
            }
            other if other.starts_with("--") => anyhow::bail!("unknown argument: {other}"),
            word => words.push(word),
        }
    }

    Ok(Command::Exec(ExecArgs {
        config,
        database,
        sql: words.join(" "),
    }))
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
dbforge - SQL statement builder toolbox

USAGE:
  dbforge <COMMAND> [OPTIONS]

COMMANDS:
  ddl           Compile a TOML table schema into CREATE TABLE statements
  exec          Send a raw statement through the configured driver
  help          Print this message

Run `dbforge <command> --help` for more."
            );
        }
        HelpTopic::Ddl => {
            println!(
                "\
USAGE:
  dbforge ddl <SCHEMA.toml> [OPTIONS]

OPTIONS:
  --dialect <NAME>      Target dialect: mysql, mariadb, postgres (default: mysql)
  --if-not-exists       Emit CREATE TABLE IF NOT EXISTS for every table
  -h, --help            Print help"
            );
        }
        HelpTopic::Exec => {
            println!(
                "\
USAGE:
  dbforge exec [OPTIONS] [--] <SQL>...

Reads the statement from stdin when no SQL is given.

OPTIONS:
  --config <FILE>       Driver config file path (default: dbforge.toml)
  --database <NAME>     Override `database` from config
  -h, --help            Print help"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_command_prints_root_help() {
        let cmd = parse_args(&args(&["dbforge"])).unwrap();
        assert!(matches!(cmd, Command::Help(HelpTopic::Root)));
    }

    #[test]
    fn parse_ddl_with_dialect() {
        let cmd = parse_args(&args(&[
            "dbforge",
            "ddl",
            "schema.toml",
            "--dialect=postgres",
            "--if-not-exists",
        ]))
        .unwrap();
        let Command::Ddl(ddl) = cmd else {
            panic!("expected ddl");
        };
        assert_eq!(ddl.schema, PathBuf::from("schema.toml"));
        assert_eq!(ddl.dialect, "postgres");
        assert!(ddl.if_not_exists);
    }

    #[test]
    fn parse_ddl_requires_schema() {
        assert!(parse_args(&args(&["dbforge", "ddl", "--dialect", "mysql"])).is_err());
        assert!(parse_args(&args(&["dbforge", "ddl", "a.toml", "b.toml"])).is_err());
    }

    #[test]
    fn parse_exec_joins_words() {
        let cmd = parse_args(&args(&[
            "dbforge",
            "exec",
            "--config",
            "local.toml",
            "SELECT",
            "1",
            "--",
            "--not-a-flag",
        ]))
        .unwrap();
        let Command::Exec(exec) = cmd else {
            panic!("expected exec");
        };
        assert_eq!(exec.config, PathBuf::from("local.toml"));
        assert_eq!(exec.database, None);
        assert_eq!(exec.sql, "SELECT 1 --not-a-flag");
    }

    #[test]
    fn unknown_command_fails() {
        assert!(parse_args(&args(&["dbforge", "migrate"])).is_err());
    }
}
