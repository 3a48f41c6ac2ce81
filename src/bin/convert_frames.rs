// Convert the most recent recorded frame sequence to MP4.
// Shares the converter module with the main app through a path include.
#[path = "../converter.rs"]
mod converter;
#[path = "../logging.rs"]
mod logging;

use converter::{ConvertOptions, FrameConverter};

fn main() {
    let _guard = logging::init("convert-frames", "warn");

    let options = ConvertOptions {
        framerate: 30,
        delete_frames: false,
    };
    let root = std::path::Path::new(".");

    let result = FrameConverter::with_ffmpeg().auto_convert(root, options);

    match result {
        Ok(report) => {
            println!(
                "Successfully converted {} frames to: {}",
                report.frame_count,
                report.output_file.display()
            );
            println!("\nStatistics:");
            println!("Total frames size: {:.2} MB", report.frames_size_mb);
            println!("Video file size: {:.2} MB", report.video_size_mb);
            println!("Compression ratio: {:.2}x", report.compression_ratio);
            if report.frames_deleted {
                println!("Original frames were deleted");
            }
        }
        Err(e) => {
            println!("Error during conversion: {}", e);
            std::process::exit(1);
        }
    }
}
