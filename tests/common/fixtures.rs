//! Fake downloader binaries, an in-memory object store and config helpers

use async_trait::async_trait;
use media_relay::config::Config;
use media_relay::{ObjectStore, Result, StorageError};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

/// Shell prelude that finds the `--paths` argument and stores it in `$dir`
const FIND_WORKDIR: &str = r#"
dir=""
prev=""
audio=0
for arg in "$@"; do
  if [ "$prev" = "--paths" ]; then dir="$arg"; fi
  if [ "$arg" = "--extract-audio" ]; then audio=1; fi
  prev="$arg"
done
"#;

/// Behaves like yt-dlp: writes `song.mp3` for audio requests, `clip.mp4` otherwise
pub const WRITES_ONE_FILE: &str = r#"
if [ "$audio" = "1" ]; then
  printf 'ID3-audio' > "$dir/song.mp3"
else
  printf 'ftyp-video' > "$dir/clip.mp4"
fi
"#;

/// Exits successfully without producing anything
pub const WRITES_NOTHING: &str = "exit 0";

/// Leaves a stray thumbnail next to the media file
pub const WRITES_SIDECAR: &str = r#"
printf 'ftyp-video' > "$dir/clip.mp4"
printf 'webp' > "$dir/clip.webp"
"#;

/// Fails the way yt-dlp does for unsupported sites
pub const FAILS: &str = r#"
echo "ERROR: Unsupported URL" >&2
exit 1
"#;

/// Write an executable shell script standing in for yt-dlp
#[cfg(unix)]
pub fn fake_ytdlp(dir: &Path, behaviour: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("yt-dlp");
    std::fs::write(&path, format!("#!/bin/sh\n{FIND_WORKDIR}\n{behaviour}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Config with dummy credentials and workspaces under `temp_root`
pub fn test_config(temp_root: &Path, binary: Option<PathBuf>) -> Config {
    let lookup = |key: &str| match key {
        "AWS_ACCESS_KEY_ID" => Some("AKIDEXAMPLE".to_string()),
        "AWS_SECRET_ACCESS_KEY" => Some("wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY".to_string()),
        "BUCKET_NAME" => Some("media".to_string()),
        "MEDIA_RELAY_TEMP_DIR" => Some(temp_root.display().to_string()),
        "YTDLP_PATH" => binary.as_ref().map(|p| p.display().to_string()),
        _ => None,
    };
    Config::from_lookup(lookup).unwrap()
}

/// Number of entries left under the workspace root
pub fn residue(temp_root: &Path) -> usize {
    std::fs::read_dir(temp_root).unwrap().count()
}

/// Object captured by [`MemoryStore`]
#[derive(Debug, Clone)]
pub struct Stored {
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
}

/// Object store that keeps uploads in memory
#[derive(Default)]
pub struct MemoryStore {
    pub objects: Mutex<Vec<Stored>>,
    pub fail_upload: bool,
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn upload(&self, key: &str, path: &Path, content_type: &str) -> Result<()> {
        if self.fail_upload {
            return Err(StorageError::UploadFailed {
                key: key.to_string(),
                message: "bucket unavailable".into(),
            }
            .into());
        }
        let body = tokio::fs::read(path).await?;
        self.objects.lock().unwrap().push(Stored {
            key: key.to_string(),
            body,
            content_type: content_type.to_string(),
        });
        Ok(())
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String> {
        Ok(format!(
            "https://media.example/{key}?X-Amz-Expires={}",
            expires_in.as_secs()
        ))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
