use image_manager_application::{BatchCompleted, ExportReport, ImageSummary, ProgressSnapshot};

pub fn present_image_row(image: &ImageSummary) -> String {
    format!(
        "{}\t{}\t{}\t{}x{}\t{}\t{}{}",
        image.order_index,
        image.id,
        image.format,
        image.width,
        image.height,
        human_bytes(image.byte_len),
        image.file_name,
        if image.is_root { "\t(root)" } else { "" }
    )
}

pub fn present_progress(progress: &ProgressSnapshot) -> String {
    let mut line = format!(
        "images={} uploaded={}/{}",
        progress.images_count, progress.uploaded_images, progress.files
    );
    if progress.failed > 0 {
        line.push_str(&format!(" failed={}", progress.failed));
    }
    if progress.uploading {
        line.push_str(" (uploading)");
    }
    line
}

pub fn present_batch(event: &BatchCompleted) -> String {
    let mut text = format!(
        "upload batch {} finished: {}/{} images added",
        event.batch_id, event.uploaded_images, event.files
    );
    for failure in &event.failures {
        text.push_str(&format!("\n  skipped {}: {}", failure.file_name, failure.reason));
    }
    text
}

pub fn present_export_report(report: &ExportReport) -> String {
    format!(
        "exported {} images to {} ({})",
        report.entries.len(),
        report.location,
        human_bytes(report.archive_bytes)
    )
}

fn human_bytes(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    let value = bytes as f64;
    if value < KIB {
        format!("{bytes} B")
    } else if value < KIB * KIB {
        format!("{:.1} KiB", value / KIB)
    } else {
        format!("{:.1} MiB", value / (KIB * KIB))
    }
}
