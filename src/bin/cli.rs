use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use trivia_api::db::queries::categories::{create_category, get_all_categories, import_categories};
use trivia_api::db::queries::questions::{get_all_questions, import_questions};
use trivia_api::db::{establish_connection, run_migrations, Category, Question};
use trivia_api::telemetry::init_tracing;

const CATEGORIES_FILE: &str = "categories.csv";
const QUESTIONS_FILE: &str = "questions.csv";

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Database URL
    #[clap(long, env = "TRIVIA_DATABASE_URL", default_value = "sqlite:trivia.db")]
    database_url: String,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations
    Migrate,
    /// Add a category with the given label
    AddCategory { name: String },
    /// Replace categories and questions with the CSV files in a directory
    Import { path: PathBuf },
    /// Write categories and questions as CSV files into a directory
    Export { path: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();
    let pool = establish_connection(&cli.database_url)
        .await
        .context("Cannot connect to DB")?;
    run_migrations(&pool).await?;

    match cli.command {
        Commands::Migrate => tracing::info!("Migrations applied"),
        Commands::AddCategory { name } => {
            add_category(&pool, &name).await.context("Cannot add category")?;
        }
        Commands::Export { path } => export_data(&pool, &path).await.context("Cannot export")?,
        Commands::Import { path } => import_data(&pool, &path).await.context("Cannot import")?,
    }
    Ok(())
}

fn write_to(path: PathBuf, data: Vec<impl Serialize>) -> anyhow::Result<()> {
    let file = std::fs::File::create(&path)
        .with_context(|| format!("Cannot create {}", path.display()))?;
    let mut wtr = csv::Writer::from_writer(file);
    for line in data {
        wtr.serialize(line)?;
    }
    wtr.flush()?;
    Ok(())
}

fn read_from<T: DeserializeOwned>(path: PathBuf) -> anyhow::Result<Vec<T>> {
    let file =
        std::fs::File::open(&path).with_context(|| format!("Cannot open {}", path.display()))?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut out = Vec::new();
    for record in rdr.deserialize() {
        let record: T = record?;
        out.push(record);
    }
    Ok(out)
}

async fn add_category(pool: &SqlitePool, name: &str) -> anyhow::Result<i64> {
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Category name should not be empty");
    }
    let id = create_category(pool, name).await?;
    tracing::info!("Added category {name} with id {id}");
    Ok(id)
}

async fn export_data(pool: &SqlitePool, path: &Path) -> anyhow::Result<()> {
    let categories = get_all_categories(pool).await?;
    let questions = get_all_questions(pool).await?;
    if !path.exists() {
        std::fs::create_dir_all(path)?
    }
    tracing::info!(
        "Exporting {} categories and {} questions to {}",
        categories.len(),
        questions.len(),
        path.display()
    );
    write_to(path.join(CATEGORIES_FILE), categories)?;
    write_to(path.join(QUESTIONS_FILE), questions)?;
    Ok(())
}

async fn import_data(pool: &SqlitePool, path: &Path) -> anyhow::Result<()> {
    let categories: Vec<Category> = read_from(path.join(CATEGORIES_FILE))?;
    let questions: Vec<Question> = read_from(path.join(QUESTIONS_FILE))?;
    tracing::info!(
        "Importing {} categories and {} questions from {}",
        categories.len(),
        questions.len(),
        path.display()
    );
    import_categories(pool, categories).await?;
    import_questions(pool, questions).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_files_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let categories = vec![
            Category { id: 1, kind: "Science".into() },
            Category { id: 2, kind: "Art, Modern".into() },
        ];
        write_to(dir.path().join(CATEGORIES_FILE), categories.clone()).unwrap();

        let header = std::fs::read_to_string(dir.path().join(CATEGORIES_FILE)).unwrap();
        assert!(header.starts_with("id,type\n"));
        let back: Vec<Category> = read_from(dir.path().join(CATEGORIES_FILE)).unwrap();
        assert_eq!(back, categories);
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_from::<Question>(dir.path().join(QUESTIONS_FILE)).unwrap_err();
        assert!(err.to_string().contains(QUESTIONS_FILE));
    }

    #[tokio::test]
    async fn add_category_trims_and_rejects_blank_names() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("trivia.db");
        let pool = establish_connection(&format!("sqlite:{}", db.display()))
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();

        let id = add_category(&pool, "  Sports ").await.unwrap();
        assert_eq!(
            get_all_categories(&pool).await.unwrap(),
            vec![Category { id, kind: "Sports".into() }]
        );
        assert!(add_category(&pool, "   ").await.is_err());
    }

    #[tokio::test]
    async fn export_then_import_restores_rows() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("trivia.db");
        let pool = establish_connection(&format!("sqlite:{}", db.display()))
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        import_categories(&pool, vec![Category { id: 3, kind: "Geography".into() }])
            .await
            .unwrap();
        import_questions(
            &pool,
            vec![Question {
                id: 13,
                question: "What is the largest lake in Africa?".into(),
                answer: "Lake Victoria".into(),
                category: 3,
                difficulty: 2,
            }],
        )
        .await
        .unwrap();

        let out = dir.path().join("dump");
        export_data(&pool, &out).await.unwrap();
        import_questions(&pool, vec![]).await.unwrap();
        assert!(get_all_questions(&pool).await.unwrap().is_empty());

        import_data(&pool, &out).await.unwrap();
        let questions = get_all_questions(&pool).await.unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].answer, "Lake Victoria");
        assert_eq!(get_all_categories(&pool).await.unwrap().len(), 1);
    }
}
