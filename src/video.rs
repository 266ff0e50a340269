//! Raw-frame video decode through a spawned ffmpeg process.
//!
//! Frames arrive as RGBA bytes over a bounded channel filled by a reader
//! thread; the render loop drains with `try_frame` and never blocks.
//! `-stream_loop -1` loops the file forever, matching a muted looping
//! background video.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Context, Result};

/// Decode resolution. Frames are box-resampled to the live grid afterward,
/// so this only bounds quality and per-frame cost.
pub const DECODE_WIDTH: u32 = 480;
pub const DECODE_HEIGHT: u32 = 270;

pub struct VideoInput {
    receiver: mpsc::Receiver<Vec<u8>>,
    worker: Option<JoinHandle<Result<()>>>,
    child: Child,
    width: u32,
    height: u32,
}

impl VideoInput {
    pub fn spawn(input_path: &Path, width: u32, height: u32) -> Result<Self> {
        let size = format!("{}x{}", width, height);
        let (sender, receiver) = mpsc::sync_channel::<Vec<u8>>(4);

        let mut child = Command::new("ffmpeg")
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-stream_loop")
            .arg("-1")
            .arg("-i")
            .arg(input_path)
            .arg("-f")
            .arg("rawvideo")
            .arg("-pix_fmt")
            .arg("rgba")
            .arg("-s")
            .arg(size)
            .arg("-sws_flags")
            .arg("area")
            .arg("-")
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .context("failed to spawn ffmpeg decoder (is ffmpeg on PATH?)")?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("failed to capture ffmpeg stdout"))?;
        let frame_size = (width * height * 4) as usize;

        let worker = thread::Builder::new()
            .name("kiosk-video-decoder".to_owned())
            .spawn(move || {
                loop {
                    let mut buffer = vec![0u8; frame_size];
                    match stdout.read_exact(&mut buffer) {
                        Ok(_) => {
                            if sender.send(buffer).is_err() {
                                break;
                            }
                        }
                        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                        Err(e) => return Err(anyhow!("failed to read from ffmpeg: {e}")),
                    }
                }
                Ok(())
            })
            .context("failed to spawn ffmpeg reader thread")?;

        Ok(Self {
            receiver,
            worker: Some(worker),
            child,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The next decoded frame if one is waiting; never blocks.
    pub fn try_frame(&self) -> Option<Vec<u8>> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for VideoInput {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}
