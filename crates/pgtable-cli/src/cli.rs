use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Tables,
    Describe,
    Search,
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Tables(GlobalArgs),
    Describe(DescribeArgs),
    Search(SearchArgs),
    Insert(InsertArgs),
    Update(UpdateArgs),
    Delete(DeleteArgs),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalArgs {
    pub config: PathBuf,
    pub database: Option<String>,
}

impl Default for GlobalArgs {
    fn default() -> Self {
        Self {
            config: PathBuf::from(DEFAULT_CONFIG),
            database: None,
        }
    }
}

pub const DEFAULT_CONFIG: &str = "pgtable.toml";

#[derive(Debug, Clone)]
pub struct DescribeArgs {
    pub global: GlobalArgs,
    pub table: String,
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct SearchArgs {
    pub global: GlobalArgs,
    pub table: String,
    pub conditions: Vec<(String, String)>,
    /// Join conditions with OR instead of AND.
    pub any: bool,
    pub columns: Vec<String>,
    pub sort: Option<String>,
    pub descending: bool,
    pub limit: Option<u64>,
    /// Print byte-encoded cells as hex.
    pub bytes: bool,
}

#[derive(Debug, Clone)]
pub struct InsertArgs {
    pub global: GlobalArgs,
    pub table: String,
    pub values: Vec<(String, String)>,
    /// Binary columns read from files.
    pub files: Vec<(String, PathBuf)>,
}

#[derive(Debug, Clone)]
pub struct UpdateArgs {
    pub global: GlobalArgs,
    pub table: String,
    pub set: Vec<(String, String)>,
    pub files: Vec<(String, PathBuf)>,
    pub conditions: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct DeleteArgs {
    pub global: GlobalArgs,
    pub table: String,
    pub conditions: Vec<(String, String)>,
    /// Compare with `>` instead of `=`/`LIKE`.
    pub greater_than: bool,
    /// Confirm deleting every row.
    pub yes: bool,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1).map(|s| s.as_str());
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first {
        "-h" | "--help" | "help" => Ok(Command::Help(HelpTopic::Root)),
        "tables" => parse_tables(it),
        "describe" => parse_describe(it),
        "search" => parse_search(it),
        "insert" => parse_insert(it),
        "update" => parse_update(it),
        "delete" => parse_delete(it),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

/// Consume a global option. Returns `false` if `token` is not one.
fn take_global<'a>(
    token: &str,
    it: &mut impl Iterator<Item = &'a str>,
    global: &mut GlobalArgs,
) -> anyhow::Result<bool> {
    match token {
        "--config" => {
            let Some(v) = it.next() else {
                anyhow::bail!("--config requires a value");
            };
            global.config = PathBuf::from(v);
        }
        _ if token.starts_with("--config=") => {
            global.config = PathBuf::from(token.trim_start_matches("--config="));
        }
        "--database" => {
            let Some(v) = it.next() else {
                anyhow::bail!("--database requires a value");
            };
            global.database = Some(v.to_string());
        }
        _ if token.starts_with("--database=") => {
            global.database = Some(token.trim_start_matches("--database=").to_string());
        }
        _ => return Ok(false),
    }
    Ok(true)
}

fn value<'a>(flag: &str, it: &mut impl Iterator<Item = &'a str>) -> anyhow::Result<&'a str> {
    it.next()
        .ok_or_else(|| anyhow::anyhow!("{flag} requires a value"))
}

/// Split `column=value`. The value may be empty or contain `=`.
pub fn parse_pair(token: &str) -> anyhow::Result<(String, String)> {
    match token.split_once('=') {
        Some((column, value)) if !column.is_empty() => Ok((column.to_string(), value.to_string())),
        _ => anyhow::bail!("expected COLUMN=VALUE, got: {token}"),
    }
}

fn parse_file_pair(token: &str) -> anyhow::Result<(String, PathBuf)> {
    let (column, path) = parse_pair(token)?;
    if path.is_empty() {
        anyhow::bail!("--file requires COLUMN=PATH, got: {token}");
    }
    Ok((column, PathBuf::from(path)))
}

fn require_table(table: Option<String>, topic: &str) -> anyhow::Result<String> {
    table.ok_or_else(|| anyhow::anyhow!("{topic} requires a table name"))
}

fn parse_tables<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut global = GlobalArgs::default();
    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Tables)),
            _ if take_global(token, &mut it, &mut global)? => {}
            _ => anyhow::bail!("unexpected argument: {token}"),
        }
    }
    Ok(Command::Tables(global))
}

fn parse_describe<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut global = GlobalArgs::default();
    let mut table = None;
    let mut json = false;

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Describe)),
            "--json" => json = true,
            _ if take_global(token, &mut it, &mut global)? => {}
            _ if token.starts_with('-') => anyhow::bail!("unknown option: {token}"),
            _ if table.is_none() => table = Some(token.to_string()),
            _ => anyhow::bail!("unexpected argument: {token}"),
        }
    }

    Ok(Command::Describe(DescribeArgs {
        global,
        table: require_table(table, "describe")?,
        json,
    }))
}

fn parse_search<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut global = GlobalArgs::default();
    let mut table = None;
    let mut conditions = Vec::new();
    let mut any = false;
    let mut columns = Vec::new();
    let mut sort = None;
    let mut descending = false;
    let mut limit = None;
    let mut bytes = false;

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Search)),
            "--or" => any = true,
            "--desc" => descending = true,
            "--bytes" => bytes = true,
            "--columns" => {
                columns = value(token, &mut it)?
                    .split(',')
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .collect();
            }
            "--sort" => sort = Some(value(token, &mut it)?.to_string()),
            "--limit" => {
                let v = value(token, &mut it)?;
                limit = Some(
                    v.parse::<u64>()
                        .map_err(|_| anyhow::anyhow!("--limit expects a number, got: {v}"))?,
                );
            }
            _ if take_global(token, &mut it, &mut global)? => {}
            _ if token.starts_with('-') => anyhow::bail!("unknown option: {token}"),
            _ if table.is_none() => table = Some(token.to_string()),
            _ => conditions.push(parse_pair(token)?),
        }
    }

    if bytes && (sort.is_some() || limit.is_some()) {
        anyhow::bail!("--bytes cannot be combined with --sort or --limit");
    }
    if !columns.is_empty() && (sort.is_some() || limit.is_some()) {
        anyhow::bail!("--columns cannot be combined with --sort or --limit (sorted searches return every column)");
    }

    Ok(Command::Search(SearchArgs {
        global,
        table: require_table(table, "search")?,
        conditions,
        any,
        columns,
        sort,
        descending,
        limit,
        bytes,
    }))
}

fn parse_insert<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut global = GlobalArgs::default();
    let mut table = None;
    let mut values = Vec::new();
    let mut files = Vec::new();

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Insert)),
            "--file" => files.push(parse_file_pair(value(token, &mut it)?)?),
            _ if take_global(token, &mut it, &mut global)? => {}
            _ if token.starts_with('-') => anyhow::bail!("unknown option: {token}"),
            _ if table.is_none() => table = Some(token.to_string()),
            _ => values.push(parse_pair(token)?),
        }
    }

    Ok(Command::Insert(InsertArgs {
        global,
        table: require_table(table, "insert")?,
        values,
        files,
    }))
}

fn parse_update<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    #[derive(PartialEq)]
    enum Section {
        Set,
        Where,
    }

    let mut global = GlobalArgs::default();
    let mut table = None;
    let mut set = Vec::new();
    let mut files = Vec::new();
    let mut conditions = Vec::new();
    let mut section = None;

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Update)),
            "--set" => section = Some(Section::Set),
            "--where" => section = Some(Section::Where),
            "--file" => files.push(parse_file_pair(value(token, &mut it)?)?),
            _ if take_global(token, &mut it, &mut global)? => {}
            _ if token.starts_with('-') => anyhow::bail!("unknown option: {token}"),
            _ if table.is_none() => table = Some(token.to_string()),
            _ => match section {
                Some(Section::Set) => set.push(parse_pair(token)?),
                Some(Section::Where) => conditions.push(parse_pair(token)?),
                None => anyhow::bail!("expected --set or --where before: {token}"),
            },
        }
    }

    Ok(Command::Update(UpdateArgs {
        global,
        table: require_table(table, "update")?,
        set,
        files,
        conditions,
    }))
}

fn parse_delete<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut global = GlobalArgs::default();
    let mut table = None;
    let mut conditions = Vec::new();
    let mut greater_than = false;
    let mut yes = false;

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Delete)),
            "--gt" => greater_than = true,
            "--yes" | "-y" => yes = true,
            _ if take_global(token, &mut it, &mut global)? => {}
            _ if token.starts_with('-') => anyhow::bail!("unknown option: {token}"),
            _ if table.is_none() => table = Some(token.to_string()),
            _ => conditions.push(parse_pair(token)?),
        }
    }

    Ok(Command::Delete(DeleteArgs {
        global,
        table: require_table(table, "delete")?,
        conditions,
        greater_than,
        yes,
    }))
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
pgtable - schema-aware table access for PostgreSQL

USAGE:
  pgtable <COMMAND> [OPTIONS]

COMMANDS:
  tables        List tables in the configured schema
  describe      Show columns and their logical types
  search        Select rows
  insert        Insert one row
  update        Update rows
  delete        Delete rows

GLOBAL OPTIONS:
  --config <FILE>       Config file path (default: pgtable.toml)
  --database <URL>      Override database.url from config
  -h, --help            Print help

Run `pgtable <command> --help` for more."
            );
        }
        HelpTopic::Tables => {
            println!(
                "\
USAGE:
  pgtable tables [GLOBAL OPTIONS]"
            );
        }
        HelpTopic::Describe => {
            println!(
                "\
USAGE:
  pgtable describe <TABLE> [--json] [GLOBAL OPTIONS]

OPTIONS:
  --json                Print the table schema as JSON"
            );
        }
        HelpTopic::Search => {
            println!(
                "\
USAGE:
  pgtable search <TABLE> [COLUMN=VALUE ...] [OPTIONS] [GLOBAL OPTIONS]

Text columns match with LIKE (use % as a wildcard); other columns with =.

OPTIONS:
  --or                  Join conditions with OR (default: AND)
  --columns <A,B,...>   Columns to return (default: all)
  --sort <COLUMN>       Order by COLUMN (ignored if unknown)
  --desc                Sort descending
  --limit <N>           Return at most N rows
  --bytes               Print cells in their byte encoding (hex)"
            );
        }
        HelpTopic::Insert => {
            println!(
                "\
USAGE:
  pgtable insert <TABLE> COLUMN=VALUE ... [--file COLUMN=PATH ...] [GLOBAL OPTIONS]

Bit columns store 1 for `true`/`1` and 0 for anything else.

OPTIONS:
  --file <COLUMN=PATH>  Read a binary column from PATH"
            );
        }
        HelpTopic::Update => {
            println!(
                "\
USAGE:
  pgtable update <TABLE> --set COLUMN=VALUE ... [--where COLUMN=VALUE ...] [GLOBAL OPTIONS]

An empty value (COLUMN=) sets the column to NULL.

OPTIONS:
  --set                 Following pairs are assignments
  --where               Following pairs are AND-ed conditions
  --file <COLUMN=PATH>  Assign a binary column from PATH"
            );
        }
        HelpTopic::Delete => {
            println!(
                "\
USAGE:
  pgtable delete <TABLE> [COLUMN=VALUE ...] [OPTIONS] [GLOBAL OPTIONS]

OPTIONS:
  --gt                  Delete rows where each COLUMN > VALUE
  -y, --yes             Required to delete every row (no conditions)"
            );
        }
    }
}
