//! Batch assembly workflow: discover images, slice them into batches and
//! drive one encoder invocation per batch, in scan order.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::Config;
use crate::discover::{find_images, partition};
use crate::error::Result;
use crate::media::{MediaEngineFactory, MediaEngineTrait};
use crate::timeline::{batch_duration, ClipSpec, ZoomClip};

/// Drives the full pipeline for one configuration.
pub struct Assembler {
    config: Config,
    media: Box<dyn MediaEngineTrait>,
}

impl Assembler {
    /// Create an assembler, verifying the encoder is present
    pub fn new(config: Config) -> Result<Self> {
        let media = MediaEngineFactory::create_engine(config.encode.clone());
        media.check_availability()?;
        Ok(Self { config, media })
    }

    /// Scan the image directory, batch the results and encode every batch in
    /// order. An empty directory is reported and treated as success; a failed
    /// batch aborts the run and leaves earlier outputs in place.
    pub async fn run(&self) -> Result<()> {
        self.report_inputs();
        std::fs::create_dir_all(&self.config.paths.output_dir)?;

        let images = find_images(&self.config.paths.image_dir)?;
        info!(
            "Found {} images in {}",
            images.len(),
            self.config.paths.image_dir.display()
        );
        if images.is_empty() {
            warn!(
                "No images found in {}, nothing to assemble",
                self.config.paths.image_dir.display()
            );
            return Ok(());
        }

        self.check_audio().await;

        let batches = partition(&images, self.config.encode.batch_size);
        info!(
            "Assembling {} images into {} batches of up to {}",
            images.len(),
            batches.len(),
            self.config.encode.batch_size
        );

        for (index, batch) in batches.iter().enumerate() {
            self.assemble_batch(batch, index + 1).await?;
        }

        info!(
            "Wrote {} batch videos to {}",
            batches.len(),
            self.config.paths.output_dir.display()
        );
        Ok(())
    }

    /// Encode one batch into `output_<number>.mp4`. Batch numbers are 1-based
    /// and follow the position of the batch in the scan order.
    async fn assemble_batch(&self, batch: &[PathBuf], number: usize) -> Result<()> {
        let spec = ClipSpec::from(&self.config.clip);
        let clips: Vec<ZoomClip> = batch
            .iter()
            .map(|image| ZoomClip::new(image.clone(), spec))
            .collect();

        let output_path = self.output_path(number);
        info!(
            "Batch {}: {} clips, {:.1} s -> {}",
            number,
            clips.len(),
            batch_duration(&spec, clips.len()),
            output_path.display()
        );
        for (index, clip) in clips.iter().enumerate() {
            info!(
                "  [{:>5.1}s] {}",
                clip.start_offset(index),
                clip.image.display()
            );
        }

        self.media
            .encode_batch(&clips, &self.config.paths.audio_path, &output_path)
            .await
    }

    /// Path of the output file for a 1-based batch number
    fn output_path(&self, number: usize) -> PathBuf {
        self.config
            .paths
            .output_dir
            .join(format!("output_{}.mp4", number))
    }

    /// Log the resolved inputs before a long run so a bad path is obvious
    /// immediately rather than after the first encode.
    fn report_inputs(&self) {
        let paths = &self.config.paths;
        info!(
            "Image directory: {} (exists: {})",
            paths.image_dir.display(),
            paths.image_dir.is_dir()
        );
        info!(
            "Audio track: {} (exists: {})",
            paths.audio_path.display(),
            paths.audio_path.is_file()
        );
        info!("Output directory: {}", paths.output_dir.display());
    }

    /// Probe the shared audio track once and warn when it cannot cover a
    /// full batch. The encoder pads the gap with silence, so this never
    /// fails the run.
    async fn check_audio(&self) {
        let audio_path = &self.config.paths.audio_path;
        match self.media.probe_duration(audio_path).await {
            Ok(duration) => {
                let spec = ClipSpec::from(&self.config.clip);
                let full_batch = batch_duration(&spec, self.config.encode.batch_size);
                info!("Audio track {} runs {:.3} s", audio_path.display(), duration);
                if duration < full_batch {
                    warn!(
                        "Audio runs {:.3} s but a full batch runs {:.1} s, the tail will be silent",
                        duration, full_batch
                    );
                }
            }
            Err(e) => warn!("Could not probe audio track: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ZoomreelError;
    use crate::media::MockMediaEngineTrait;
    use std::fs::File;
    use std::path::Path;
    use tempfile::TempDir;

    fn test_config(root: &Path) -> Config {
        let mut config = Config::default();
        config.paths.image_dir = root.join("images");
        config.paths.audio_path = root.join("track.m4a");
        config.paths.output_dir = root.join("out");
        config
    }

    fn seed_images(dir: &Path, count: usize) -> Vec<PathBuf> {
        std::fs::create_dir_all(dir).unwrap();
        (0..count)
            .map(|i| {
                let path = dir.join(format!("img_{i:02}.jpg"));
                File::create(&path).unwrap();
                path
            })
            .collect()
    }

    #[tokio::test]
    async fn test_run_with_no_images_succeeds_without_encoding() {
        let root = TempDir::new().unwrap();
        let config = test_config(root.path());
        std::fs::create_dir_all(&config.paths.image_dir).unwrap();

        let mut media = MockMediaEngineTrait::new();
        media.expect_encode_batch().times(0);
        media.expect_probe_duration().times(0);

        let assembler = Assembler {
            config,
            media: Box::new(media),
        };
        assembler.run().await.unwrap();
        assert!(root.path().join("out").is_dir());
    }

    #[tokio::test]
    async fn test_run_full_batch_yields_single_output() {
        let root = TempDir::new().unwrap();
        let config = test_config(root.path());
        seed_images(&config.paths.image_dir, 10);

        let mut media = MockMediaEngineTrait::new();
        media.expect_probe_duration().returning(|_| Ok(30.0));
        media
            .expect_encode_batch()
            .withf(|clips, _, output| clips.len() == 10 && output.ends_with("output_1.mp4"))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let assembler = Assembler {
            config,
            media: Box::new(media),
        };
        assembler.run().await.unwrap();
    }

    #[tokio::test]
    async fn test_run_splits_fifteen_images_into_two_batches() {
        let root = TempDir::new().unwrap();
        let config = test_config(root.path());
        let images = seed_images(&config.paths.image_dir, 15);
        let first_of_batch_1 = images[0].clone();
        let first_of_batch_2 = images[10].clone();

        let mut media = MockMediaEngineTrait::new();
        media.expect_probe_duration().returning(|_| Ok(30.0));
        media
            .expect_encode_batch()
            .withf(move |clips, _, output| {
                clips.len() == 10
                    && clips[0].image == first_of_batch_1
                    && output.ends_with("output_1.mp4")
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        media
            .expect_encode_batch()
            .withf(move |clips, _, output| {
                clips.len() == 5
                    && clips[0].image == first_of_batch_2
                    && output.ends_with("output_2.mp4")
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let assembler = Assembler {
            config,
            media: Box::new(media),
        };
        assembler.run().await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_batch_aborts_the_run() {
        let root = TempDir::new().unwrap();
        let config = test_config(root.path());
        seed_images(&config.paths.image_dir, 15);

        let mut media = MockMediaEngineTrait::new();
        media.expect_probe_duration().returning(|_| Ok(30.0));
        media
            .expect_encode_batch()
            .times(1)
            .returning(|_, _, _| Err(ZoomreelError::Media("encoder exploded".to_string())));

        let assembler = Assembler {
            config,
            media: Box::new(media),
        };
        let result = assembler.run().await;
        assert!(matches!(result, Err(ZoomreelError::Media(_))));
    }

    #[tokio::test]
    async fn test_unreadable_audio_is_not_fatal() {
        let root = TempDir::new().unwrap();
        let config = test_config(root.path());
        seed_images(&config.paths.image_dir, 1);

        let mut media = MockMediaEngineTrait::new();
        media
            .expect_probe_duration()
            .returning(|_| Err(ZoomreelError::Probe("no such track".to_string())));
        media
            .expect_encode_batch()
            .withf(|clips, _, output| clips.len() == 1 && output.ends_with("output_1.mp4"))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let assembler = Assembler {
            config,
            media: Box::new(media),
        };
        assembler.run().await.unwrap();
    }
}
