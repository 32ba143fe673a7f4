use axum::extract::Multipart;
use axum::extract::multipart::Field;
use image_store::ImageFile;

use crate::error::ProductResult;
use crate::models::{CreateProductForm, UpdateProductForm};

/// Drains the form. Parts carrying a filename under `file_field` become
/// files; every other named part is handed to `on_text`.
pub(crate) async fn collect(
    mut multipart: Multipart,
    file_field: &str,
    mut on_text: impl FnMut(&str, String),
) -> ProductResult<Vec<ImageFile>> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if field.file_name().is_some() {
            if name == file_field {
                files.push(read_file(field).await?);
            } else {
                tracing::debug!(field = %name, "Ignoring unexpected file part");
            }
            continue;
        }

        on_text(&name, field.text().await?);
    }

    Ok(files)
}

async fn read_file(field: Field<'_>) -> ProductResult<ImageFile> {
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let file_name = field.file_name().map(str::to_string);
    let bytes = field.bytes().await?;

    let file = ImageFile::new(bytes.to_vec(), content_type);
    Ok(match file_name {
        Some(name) => file.with_file_name(name),
        None => file,
    })
}

pub(crate) async fn create_form(
    multipart: Multipart,
) -> ProductResult<(CreateProductForm, Vec<ImageFile>)> {
    let mut form = CreateProductForm::default();
    let files = collect(multipart, "images", |name, value| match name {
        "name" => form.name = Some(value),
        "price" => form.price = Some(value),
        "description" => form.description = Some(value),
        "images" if !value.trim().is_empty() => form.image_urls.push(value),
        _ => {}
    })
    .await?;

    Ok((form, files))
}

pub(crate) async fn update_form(
    multipart: Multipart,
) -> ProductResult<(UpdateProductForm, Vec<ImageFile>)> {
    let mut form = UpdateProductForm::default();
    let files = collect(multipart, "images", |name, value| match name {
        "name" => form.name = Some(value),
        "price" => form.price = Some(value),
        "description" => form.description = Some(value),
        "existingImages" => form.existing_images = Some(value),
        _ => {}
    })
    .await?;

    Ok((form, files))
}
