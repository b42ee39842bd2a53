//! A band writing a song: producer, singer, guitarist and critic run one after
//! another, sharing `Song_Info.txt` and `Critique.txt` through a filesystem service.
//!
//! Run with `OPENAI_API_KEY=... cargo run --example band [folder]`.
//! The agents never run concurrently; the shared files are not locked.

use std::path::PathBuf;
use std::sync::Arc;

use mini_agent::prelude::*;
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;

fn filename_param(what: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "filename": { "type": "string", "description": format!("The name of the file to {what}.") }
        },
        "required": ["filename"]
    })
}

fn arg<'a>(args: &'a Value, key: &str) -> Result<&'a str, ServiceError> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ServiceError::ParamsNotMatched(format!("missing string argument '{key}'")))
}

fn io_error(command: &str) -> impl Fn(std::io::Error) -> ServiceError + '_ {
    move |e| ServiceError::execution(command, e)
}

async fn file_exists(root: Arc<PathBuf>, args: Value) -> Result<Value, ServiceError> {
    let path = root.join(arg(&args, "filename")?);
    let exists = tokio::fs::try_exists(&path)
        .await
        .map_err(io_error("fsService-fileExists"))?;
    Ok(Value::Bool(exists))
}

async fn create_file(root: Arc<PathBuf>, args: Value) -> Result<Value, ServiceError> {
    let filename = arg(&args, "filename")?;
    tokio::fs::create_dir_all(root.as_path())
        .await
        .map_err(io_error("fsService-createFile"))?;
    tokio::fs::write(root.join(filename), "")
        .await
        .map_err(io_error("fsService-createFile"))?;
    Ok(json!(format!("Created {filename}")))
}

async fn read_file(root: Arc<PathBuf>, args: Value) -> Result<Value, ServiceError> {
    let content = tokio::fs::read_to_string(root.join(arg(&args, "filename")?))
        .await
        .map_err(io_error("fsService-readFile"))?;
    Ok(Value::String(content))
}

async fn append_file(root: Arc<PathBuf>, args: Value) -> Result<Value, ServiceError> {
    let filename = arg(&args, "filename")?;
    let content = arg(&args, "content")?;
    tokio::fs::create_dir_all(root.as_path())
        .await
        .map_err(io_error("fsService-appendFile"))?;
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(root.join(filename))
        .await
        .map_err(io_error("fsService-appendFile"))?;
    file.write_all(content.as_bytes())
        .await
        .map_err(io_error("fsService-appendFile"))?;
    Ok(json!(format!("Appended content to {filename}")))
}

async fn delete_file(root: Arc<PathBuf>, args: Value) -> Result<Value, ServiceError> {
    let filename = arg(&args, "filename")?;
    tokio::fs::remove_file(root.join(filename))
        .await
        .map_err(io_error("fsService-deleteFile"))?;
    Ok(json!(format!("Deleted {filename}")))
}

/// `fsService` rooted at `folder`. File names are joined onto the folder as given.
fn fs_service(folder: PathBuf) -> Result<ServiceRegistry, ServiceError> {
    let folder = Arc::new(folder);
    let append_params = json!({
        "type": "object",
        "properties": {
            "filename": { "type": "string", "description": "The name of the file to append content to." },
            "content": { "type": "string", "description": "The content of the file to append." }
        },
        "required": ["filename", "content"]
    });

    let mut registry = ServiceRegistry::new();
    let (a, b, c, d, e) = (folder.clone(), folder.clone(), folder.clone(), folder.clone(), folder);
    registry
        .register_fn(
            CommandDescriptor::new("fsService", "fileExists", "Check if a file exists.", filename_param("check")),
            move |args| file_exists(a.clone(), args),
        )?
        .register_fn(
            CommandDescriptor::new("fsService", "createFile", "Create a file.", filename_param("create")),
            move |args| create_file(b.clone(), args),
        )?
        .register_fn(
            CommandDescriptor::new("fsService", "readFile", "Read content from a file.", filename_param("read")),
            move |args| read_file(c.clone(), args),
        )?
        .register_fn(
            CommandDescriptor::new("fsService", "appendFile", "Append a file.", append_params),
            move |args| append_file(d.clone(), args),
        )?
        .register_fn(
            CommandDescriptor::new("fsService", "deleteFile", "Delete a file.", filename_param("delete")),
            move |args| delete_file(e.clone(), args),
        )?;

    Ok(registry)
}

const PRODUCER: &str = r#"You are the producer of a band.
Your role is to decide the basic information about a song.
Do not respond until you completed the steps below.
STEPS:
- If the file named "Critique.txt" exists, read it.
- Use a file named "Song_Info.txt".
- If you read a critique, and the details of the song are already written in the file, skip the next step.
- If the song details are missing, write the following details in the file: Title, Genre, Theme, Style, Rhyme Scheme, Key, Time Signature, BPM.
- If the song details are already written in the file, write just below them, before the lyrics, how to modify the song because of the critique and why, so the next agents can understand.
- The values you choose are to be creative but realistic for a song.
- After completing the song information and writing it in the file, say: "Producer task completed""#;

const SINGER: &str = r#"You are the singer of a band.
Your role is to create or modify lyrics for a song based on the information provided by the producer.
Do not respond until you completed the steps below.
STEPS:
- Read the file named "Song_Info.txt" created by the producer.
- Understand the theme, style, structure and the modifications if present.
- Write lyrics that fit the rhyme scheme and theme, or change the current ones following the modification instructions.
- Append the lyrics to the "Song_Info.txt" file under a new section titled "Lyrics".
- Once you have finished writing the lyrics in the file, say: "Singer task completed""#;

const GUITARIST: &str = r#"You are the guitarist of a band.
Your role is to integrate or modify guitar chords into the song's lyrics based on the information provided.
Do not respond until you have completed the steps below.
STEPS:
- Read the file named "Song_Info.txt", which contains song information and lyrics.
- Understand the key, time signature, BPM, and feel of the song.
- Create guitar chords that complement the lyrics and fit the song's mood and style.
- Write the chords directly above the corresponding lyrics in the "Song_Info.txt" file, aligned with the words where the chord changes.
- After integrating the chords in the file, respond with: "Guitarist task completed""#;

const CRITIC: &str = r#"You are an external music critic.
Your role is to critique the completed song, based on the contributions of the producer, singer, and guitarist.
Do not respond until you completed the steps below.
STEPS:
- Read the file named "Song_Info.txt", which includes the song's basic information, lyrics, and guitar chords.
- Analyze the song's coherence, creativity, musicality and overall appeal.
- Write a detailed, respectful and constructive critique with specific examples from the song.
- Append your critique to the file named "Critique.txt" under a section titled "Critique for <song name>".
- Upon completing your critique and writing it in the file, say: "Critic task completed""#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    let folder = std::env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("./"));
    let services = fs_service(folder)?;

    let base = AgentConfig::default()
        .with_model("gpt-4-1106-preview")
        .with_temperature(0.4)
        .with_debug(true)
        .with_env();

    let roles = [("producer", PRODUCER), ("singer", SINGER), ("guitarist", GUITARIST), ("critic", CRITIC)];
    let mut total_price = 0.0;
    for (id, system_message) in roles {
        let config = base.clone().with_id(id).with_system_message(system_message);
        let mut agent = Agent::openai(config, services.clone())?;

        let response = agent.process_message("start").await?;
        println!("[{id}] {response}");
        total_price += agent.price();
    }

    println!("Total price: ${total_price:.4}");
    Ok(())
}
