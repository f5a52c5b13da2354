mod cli;
mod commands;
mod config;
mod output;

pub async fn run(args: Vec<String>) -> anyhow::Result<()> {
    match cli::parse_args(&args)? {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            Ok(())
        }
        cli::Command::Tables(global) => commands::tables(global).await,
        cli::Command::Describe(args) => commands::describe(args).await,
        cli::Command::Search(args) => commands::search(args).await,
        cli::Command::Insert(args) => commands::insert(args).await,
        cli::Command::Update(args) => commands::update(args).await,
        cli::Command::Delete(args) => commands::delete(args).await,
    }
}
