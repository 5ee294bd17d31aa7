//! E2E tests: uploading product images.

use actix_web::http::Method;
use catalog_admin_lib::entity::product_image;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

use super::test_helpers::*;

/// Batch upload with alt texts by position and a single primary.
#[actix_rt::test]
async fn test_upload_batch_creates_rows_and_files() {
    let env = TestEnv::new().await;
    let app = create_test_app(&env).await;
    let admin = env.admin_token();
    let product_id = create_product(&app, &admin, "Lamp").await;

    let images = upload_images(
        &app,
        &admin,
        &product_id,
        &[
            Part::image("front.png"),
            Part::image("back.PNG"),
            Part::text("alt_text", "Front"),
            Part::text("alt_text", ""),
            Part::text("is_primary", "true"),
        ],
    )
    .await;

    assert_eq!(images.len(), 2);
    assert_eq!(images[0]["alt_text"], "Front");
    assert_eq!(images[1]["alt_text"], "Product image 2");
    assert_eq!(images[0]["is_primary"], true);
    assert_eq!(images[1]["is_primary"], false);
    assert_eq!(images[0]["product"]["name"], "Lamp");

    for image in &images {
        let url = image["url"].as_str().unwrap();
        assert!(url.starts_with("/uploads/products/images-"), "url: {}", url);
        assert!(url.ends_with(".png"), "url: {}", url);
    }

    let mut expected: Vec<String> = images.iter().map(|i| filename_of(&i["url"])).collect();
    expected.sort();
    assert_eq!(env.stored_files(), expected);
}

/// A new primary replaces the existing one; only the first flagged file wins.
#[actix_rt::test]
async fn test_new_primary_clears_previous_primary() {
    let env = TestEnv::new().await;
    let app = create_test_app(&env).await;
    let admin = env.admin_token();
    let product_id = create_product(&app, &admin, "Chair").await;
    let product_uuid = Uuid::parse_str(&product_id).unwrap();

    let first = upload_images(
        &app,
        &admin,
        &product_id,
        &[Part::image("a.png"), Part::text("is_primary", "true")],
    )
    .await;
    assert_eq!(first[0]["is_primary"], true);

    let second = upload_images(
        &app,
        &admin,
        &product_id,
        &[
            Part::image("b.png"),
            Part::image("c.png"),
            Part::text("is_primary", "false"),
            Part::text("is_primary", "true"),
        ],
    )
    .await;
    assert_eq!(second[0]["is_primary"], false);
    assert_eq!(second[1]["is_primary"], true);

    assert_eq!(env.pool.count_primary_images(product_uuid).await.unwrap(), 1);

    let (status, list) = send_json(
        &app,
        Method::GET,
        &format!("/api/products/{}/images", product_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, 200);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0]["id"], first[0]["id"]);
    assert_eq!(list[0]["is_primary"], false);
    assert_eq!(list[2]["id"], second[1]["id"]);
    assert_eq!(list[2]["is_primary"], true);
}

#[actix_rt::test]
async fn test_unknown_product_leaves_no_files() {
    let env = TestEnv::new().await;
    let app = create_test_app(&env).await;

    let (status, body) = send_multipart(
        &app,
        Method::POST,
        &format!("/api/products/{}/images", Uuid::new_v4()),
        Some(&env.admin_token()),
        &[Part::image("a.png"), Part::image("b.png")],
    )
    .await;

    assert_eq!(status, 404);
    assert_eq!(body["error"], "Product not found");
    assert!(env.stored_files().is_empty());
}

/// A failing insert rolls back and removes every file written for the request.
#[actix_rt::test]
async fn test_insert_failure_leaves_no_files() {
    let env = TestEnv::new().await;
    let app = create_test_app(&env).await;
    let admin = env.admin_token();
    let product_id = create_product(&app, &admin, "Desk").await;

    env.exec("DROP TABLE product_images").await;

    let (status, body) = send_multipart(
        &app,
        Method::POST,
        &format!("/api/products/{}/images", product_id),
        Some(&admin),
        &[Part::image("a.png"), Part::image("b.png")],
    )
    .await;

    assert_eq!(status, 500);
    assert_eq!(body["error"], "Failed to create product images");
    assert!(body["details"].is_string());
    assert!(env.stored_files().is_empty());
}

/// A failing insert also undoes the clear-primary update of the same batch.
#[actix_rt::test]
async fn test_failed_batch_keeps_existing_primary() {
    let env = TestEnv::new().await;
    let app = create_test_app(&env).await;
    let admin = env.admin_token();
    let product_id = create_product(&app, &admin, "Couch").await;
    let product_uuid = Uuid::parse_str(&product_id).unwrap();

    let original = upload_images(
        &app,
        &admin,
        &product_id,
        &[Part::image("a.png"), Part::text("is_primary", "true")],
    )
    .await;

    env.exec(
        "CREATE TRIGGER fail_image_insert BEFORE INSERT ON product_images \
         BEGIN SELECT RAISE(ABORT, 'simulated failure'); END;",
    )
    .await;

    let (status, body) = send_multipart(
        &app,
        Method::POST,
        &format!("/api/products/{}/images", product_id),
        Some(&admin),
        &[
            Part::image("b.png"),
            Part::image("c.png"),
            Part::text("is_primary", "true"),
        ],
    )
    .await;

    assert_eq!(status, 500);
    assert_eq!(body["error"], "Failed to create product images");
    assert_eq!(env.pool.count_primary_images(product_uuid).await.unwrap(), 1);

    let original_id = Uuid::parse_str(original[0]["id"].as_str().unwrap()).unwrap();
    let kept = env
        .pool
        .find_product_image(Some(product_uuid), original_id)
        .await
        .unwrap()
        .unwrap();
    assert!(kept.is_primary);
    assert_eq!(env.stored_files(), vec![filename_of(&original[0]["url"])]);
}

/// The schema itself refuses a second primary image for one product.
#[actix_rt::test]
async fn test_schema_rejects_second_primary() {
    let env = TestEnv::new().await;
    let app = create_test_app(&env).await;
    let admin = env.admin_token();
    let product_id = create_product(&app, &admin, "Ottoman").await;
    let product_uuid = Uuid::parse_str(&product_id).unwrap();

    upload_images(
        &app,
        &admin,
        &product_id,
        &[Part::image("a.png"), Part::text("is_primary", "true")],
    )
    .await;

    let second = product_image::ActiveModel {
        id: Set(Uuid::now_v7()),
        product_id: Set(product_uuid),
        url: Set("/uploads/products/direct.png".to_string()),
        alt_text: Set("Direct insert".to_string()),
        is_primary: Set(true),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(env.pool.connection())
    .await;

    assert!(second.is_err(), "second primary row must be rejected");
    assert_eq!(env.pool.count_primary_images(product_uuid).await.unwrap(), 1);
}

#[actix_rt::test]
async fn test_non_image_rejected_and_earlier_files_removed() {
    let env = TestEnv::new().await;
    let app = create_test_app(&env).await;
    let admin = env.admin_token();
    let product_id = create_product(&app, &admin, "Rug").await;

    let (status, body) = send_multipart(
        &app,
        Method::POST,
        &format!("/api/products/{}/images", product_id),
        Some(&admin),
        &[
            Part::image("a.png"),
            Part::File {
                name: "images",
                filename: "notes.txt",
                content_type: "text/plain",
                data: b"hello",
            },
        ],
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "Only image files are allowed!");
    assert!(env.stored_files().is_empty());
}

#[actix_rt::test]
async fn test_no_files_rejected() {
    let env = TestEnv::new().await;
    let app = create_test_app(&env).await;
    let admin = env.admin_token();
    let product_id = create_product(&app, &admin, "Vase").await;

    let (status, body) = send_multipart(
        &app,
        Method::POST,
        &format!("/api/products/{}/images", product_id),
        Some(&admin),
        &[Part::text("alt_text", "Nothing attached")],
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "No images uploaded");
}

#[actix_rt::test]
async fn test_file_under_unexpected_field_rejected() {
    let env = TestEnv::new().await;
    let app = create_test_app(&env).await;
    let admin = env.admin_token();
    let product_id = create_product(&app, &admin, "Mug").await;

    let (status, body) = send_multipart(
        &app,
        Method::POST,
        &format!("/api/products/{}/images", product_id),
        Some(&admin),
        &[Part::File {
            name: "photo",
            filename: "a.png",
            content_type: "image/png",
            data: PNG_BYTES,
        }],
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "Unexpected field: photo");
    assert!(env.stored_files().is_empty());
}

#[actix_rt::test]
async fn test_oversized_file_rejected() {
    let mut env = TestEnv::new().await;
    env.config.uploads.max_file_size = 8;
    let app = create_test_app(&env).await;
    let admin = env.admin_token();
    let product_id = create_product(&app, &admin, "Poster").await;

    let (status, _) = send_multipart(
        &app,
        Method::POST,
        &format!("/api/products/{}/images", product_id),
        Some(&admin),
        &[Part::image("big.png")],
    )
    .await;

    assert_eq!(status, 413);
    assert!(env.stored_files().is_empty());
}

#[actix_rt::test]
async fn test_upload_requires_admin() {
    let env = TestEnv::new().await;
    let app = create_test_app(&env).await;
    let product_id = create_product(&app, &env.admin_token(), "Shelf").await;
    let uri = format!("/api/products/{}/images", product_id);

    let (status, body) = send_multipart(
        &app,
        Method::POST,
        &uri,
        Some(&env.customer_token()),
        &[Part::image("a.png")],
    )
    .await;
    assert_eq!(status, 403);
    assert_eq!(body["error"], "Access denied: Admin role required");

    let (status, body) =
        send_multipart(&app, Method::POST, &uri, None, &[Part::image("a.png")]).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Not authenticated.");

    let (status, _) = send_multipart(
        &app,
        Method::POST,
        &uri,
        Some("not-a-jwt"),
        &[Part::image("a.png")],
    )
    .await;
    assert_eq!(status, 403);

    assert!(env.stored_files().is_empty());
}
