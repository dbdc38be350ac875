use std::path::PathBuf;

use hamming_core::pipeline::decode_text;
use hamming_core::{
    Artifact, Codec, Config, DirSink, PathSource, RecordStats, Result, Session, is_previewable,
};
use tracing::info;

pub async fn handle_run(config: Config, input: PathBuf, out_dir: PathBuf, json: bool) -> Result<()> {
    let session = Session::from_config(&config)?;
    let source = PathSource::open(&input).await?;
    let selection = session.select(source).await?;
    let record = selection.record();

    let sink = DirSink::new(&out_dir);
    for artifact in Artifact::ALL {
        if let Some(name) = session.download(artifact, &sink)? {
            eprintln!("{:<18} {}", artifact, out_dir.join(name).display());
        }
    }

    let stats = RecordStats::of(record);
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("file:             {} ({} bytes, level {})", stats.name, stats.content_bytes, config.level);
    println!("encoded:          {} bytes", stats.encoded_bytes);
    println!(
        "recovered:        {} bytes, {}",
        stats.recovered_bytes,
        if stats.recovered_exact { "exact" } else { "MISMATCH" }
    );
    println!(
        "corrupted plain:  {} bytes, {} differ",
        stats.corrupted_plain_bytes, stats.corrupted_plain_diff_bytes
    );
    println!("blake3 original:  {}", stats.content_blake3);
    println!("blake3 recovered: {}", stats.recovered_blake3);

    if let Some(preview) = session.preview() {
        println!();
        println!("--- original ---");
        println!("{}", preview.original);
        println!("--- without correction ---");
        println!("{}", preview.corrupted);
    }
    Ok(())
}

pub fn handle_names(name: &str) -> Result<()> {
    for artifact in Artifact::ALL {
        println!("{:<18} {}", artifact, artifact.derive_name(name));
    }
    Ok(())
}

pub async fn handle_classify(config: &Config, input: PathBuf) -> Result<()> {
    let meta = tokio::fs::metadata(&input).await?;
    config.check_size(meta.len())?;
    let bytes = tokio::fs::read(&input).await?;
    let verdict = if is_previewable(&decode_text(&bytes)) {
        "text"
    } else {
        "binary"
    };
    println!("{}: {}", input.display(), verdict);
    Ok(())
}

pub fn handle_encode(config: &Config, input: PathBuf, out: PathBuf) -> Result<()> {
    let data = std::fs::read(&input)?;
    let codec = config.build_codec()?;
    let encoded = codec.encode(&data)?;
    std::fs::write(&out, &encoded)?;
    info!(input = %input.display(), out = %out.display(), level = %config.level, bytes = encoded.len(), "encoded");
    Ok(())
}

pub fn handle_corrupt(config: &Config, input: PathBuf, out: Option<PathBuf>) -> Result<()> {
    let data = std::fs::read(&input)?;
    let codec = config.build_codec()?;
    let corrupted = codec.corrupt(&data)?;
    let out = out.unwrap_or(input);
    std::fs::write(&out, &corrupted)?;
    info!(out = %out.display(), bytes = corrupted.len(), "corrupted");
    Ok(())
}

pub fn handle_decode(config: &Config, input: PathBuf, out: PathBuf, no_fix: bool) -> Result<()> {
    let data = std::fs::read(&input)?;
    // block size comes from the container header
    let codec = config.build_codec()?;
    let decoded = codec.decode(&data, !no_fix)?;
    std::fs::write(&out, &decoded)?;
    info!(out = %out.display(), bytes = decoded.len(), corrected = !no_fix, "decoded");
    Ok(())
}
