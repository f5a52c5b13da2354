use crate::cli::{DeleteArgs, DescribeArgs, GlobalArgs, InsertArgs, SearchArgs, UpdateArgs};
use crate::config::Settings;
use crate::output;
use pgtable::{Database, Predicate, SortOptions};
use std::path::PathBuf;

async fn open(global: &GlobalArgs) -> anyhow::Result<Database> {
    let settings = Settings::resolve(global)?;
    tracing::debug!(
        schema = %settings.connect.schema,
        timeout = ?settings.options.query_timeout,
        "opening database"
    );
    let db = Database::connect_with(&settings.connect, settings.options).await?;
    if !db.is_healthy() {
        let messages = db.error_messages();
        db.close().await;
        anyhow::bail!("failed to load table catalog:\n{}", messages.trim_end());
    }
    Ok(db)
}

/// Run `f` against an open database and close it afterwards, even on failure.
async fn with_db<T>(
    global: &GlobalArgs,
    f: impl AsyncFnOnce(&Database) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    let db = open(global).await?;
    let result = f(&db).await;
    db.close().await;
    result
}

fn read_files(files: &[(String, PathBuf)]) -> anyhow::Result<Vec<(String, Vec<u8>)>> {
    files
        .iter()
        .map(|(column, path)| {
            let bytes = std::fs::read(path)
                .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
            Ok((column.clone(), bytes))
        })
        .collect()
}

pub async fn tables(global: GlobalArgs) -> anyhow::Result<()> {
    with_db(&global, async |db| {
        let catalog = db.catalog();
        if catalog.is_empty() {
            println!("No tables in schema {}.", db.driver().schema());
            return Ok(());
        }
        println!("{}", output::tables_table(catalog.tables()));
        Ok(())
    })
    .await
}

pub async fn describe(args: DescribeArgs) -> anyhow::Result<()> {
    with_db(&args.global, async |db| {
        let schema = db.catalog().table(&args.table)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(schema)?);
        } else {
            println!("{}", output::describe_table(schema));
        }
        Ok(())
    })
    .await
}

pub async fn search(args: SearchArgs) -> anyhow::Result<()> {
    with_db(&args.global, async |db| {
        let filter = if args.any {
            Predicate::all_or(args.conditions.iter().cloned())
        } else {
            Predicate::all_and(args.conditions.iter().cloned())
        };

        let all = args.columns.is_empty() || args.columns.iter().any(|c| c == "*");
        let columns: Vec<&str> = if all {
            db.columns_of(&args.table)?
        } else {
            args.columns.iter().map(String::as_str).collect()
        };

        if args.bytes {
            let rows = db.search_bytes(&args.table, &filter, &columns).await?;
            println!("{}", output::byte_rows_table(&columns, &rows));
            println!("({} rows)", rows.len());
            return Ok(());
        }

        let rows = if args.sort.is_some() || args.limit.is_some() {
            let mut sort = match &args.sort {
                Some(column) => SortOptions::by(column.as_str()),
                None => SortOptions::new(),
            };
            if args.descending {
                sort = sort.descending();
            }
            if let Some(n) = args.limit {
                sort = sort.limit(n);
            }
            db.search_sorted(&args.table, &filter, &sort).await?
        } else {
            db.search(&args.table, &filter, &columns).await?
        };

        println!("{}", output::string_rows_table(&columns, &rows));
        println!("({} rows)", rows.len());
        Ok(())
    })
    .await
}

pub async fn insert(args: InsertArgs) -> anyhow::Result<()> {
    let files = read_files(&args.files)?;
    with_db(&args.global, async |db| {
        let n = db
            .insert_mixed(&args.table, args.values.iter().cloned(), files)
            .await?;
        println!("Inserted {n} row(s) into {}.", args.table);
        Ok(())
    })
    .await
}

pub async fn update(args: UpdateArgs) -> anyhow::Result<()> {
    let files = read_files(&args.files)?;
    with_db(&args.global, async |db| {
        let filter = Predicate::all_and(args.conditions.iter().cloned());
        let n = db
            .update_mixed(&args.table, args.set.iter().cloned(), files, &filter)
            .await?;
        println!("Updated {n} row(s) in {}.", args.table);
        Ok(())
    })
    .await
}

pub async fn delete(args: DeleteArgs) -> anyhow::Result<()> {
    if args.conditions.is_empty() && !args.yes {
        anyhow::bail!(
            "refusing to delete every row of {}; pass --yes to confirm",
            args.table
        );
    }

    with_db(&args.global, async |db| {
        let filter = Predicate::all_and(args.conditions.iter().cloned());
        let n = if args.conditions.is_empty() {
            db.delete_all(&args.table).await?
        } else if args.greater_than {
            db.delete_where_greater_than(&args.table, &filter).await?
        } else {
            db.delete(&args.table, &filter).await?
        };
        println!("Deleted {n} row(s) from {}.", args.table);
        Ok(())
    })
    .await
}
