use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use failure::{format_err, ResultExt};
use ndarray::prelude::*;
use zip::ZipArchive;

use crate::errors::*;

pub type SlotName = String;
pub type ActionId = usize;

pub fn one_hot(size: usize, index: usize) -> Array1<f32> {
    let mut vector = Array1::zeros(size);
    if index < size {
        vector[index] = 1.0;
    }
    vector
}

/// Index of the first maximum value, `None` when the array is empty
pub fn argmax(values: &ArrayView1<f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &value) in values.iter().enumerate() {
        match best {
            Some((_, best_value)) if best_value >= value => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

pub fn extract_model_zip_archive<R: io::Read + io::Seek>(
    zip_reader: R,
    dest_path: &Path,
) -> Result<PathBuf> {
    let mut archive =
        ZipArchive::new(zip_reader).with_context(|_| "Could not read model zip data")?;
    for file_index in 0..archive.len() {
        let mut file = archive.by_index(file_index)?;
        let enclosed_name = file
            .enclosed_name()
            .map(|name| name.to_path_buf())
            .ok_or_else(|| format_err!("Unsafe file path in archive: '{}'", file.name()))?;
        let outpath = dest_path.join(enclosed_name);

        if file.name().ends_with('/') || file.name().ends_with('\\') {
            fs::create_dir_all(&outpath)?;
        } else {
            if let Some(p) = outpath.parent() {
                if !p.exists() {
                    fs::create_dir_all(&p)?;
                }
            }
            let mut outfile = fs::File::create(&outpath)
                .with_context(|_| format!("Cannot create file '{:?}'", outpath))?;
            io::copy(&mut file, &mut outfile)?;
        }
    }
    let first_archive_file = archive
        .by_index(0)?
        .enclosed_name()
        .map(|name| name.to_path_buf())
        .ok_or_else(|| format_err!("Trained model archive is incorrect"))?;
    let model_dir_path = first_archive_file
        .components()
        .find(|component| matches!(component, Component::Normal(_)))
        .ok_or_else(|| format_err!("Trained model archive is incorrect"))?
        .as_os_str()
        .to_owned();
    let model_dir_name = model_dir_path
        .to_str()
        .ok_or_else(|| format_err!("Model directory name is empty"))?;
    Ok(dest_path.join(model_dir_name))
}
