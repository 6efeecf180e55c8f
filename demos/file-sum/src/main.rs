//! Worked example: three part files are written to a temporary directory;
//! asking for `joined.txt`'s content sum triggers `JoinFilesRule`, which
//! declares the three parts as dependencies, concatenates them once all
//! three have resolved, and lets the joined file answer itself. The Rust
//! rendering of `Examples/JoinFiles/Source/Main.c`.

use std::sync::Arc;

use b_engine::{EngineConfig, Main};
use b_shared::QuestionValue;
use file_sum::{FileContentSumQuestion, JoinFilesRule};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    b_shared::init_tracing();

    let dir = tempfile::tempdir()?;
    let one = dir.path().join("one.txt");
    let two = dir.path().join("two.txt");
    let three = dir.path().join("three.txt");
    let joined = dir.path().join("joined.txt");

    std::fs::write(&one, b"one\n")?;
    std::fs::write(&two, b"two\n")?;
    std::fs::write(&three, b"three\n")?;

    let rule = Arc::new(JoinFilesRule {
        parts: vec![one, two, three],
        joined: joined.clone(),
    });

    let config = EngineConfig::load()?;
    let main = Main::from_config(&config, tokio::runtime::Handle::current(), rule).await?;

    let question: Box<dyn QuestionValue> = Box::new(FileContentSumQuestion(joined.clone()));
    let answer = main.run_until_resolved(question).await?;

    println!(
        "content sum of {} = {:?}",
        joined.display(),
        answer.as_ref()
    );

    Ok(())
}
