//! E2E tests: reading and deleting product images.

use actix_web::http::Method;
use uuid::Uuid;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_delete_image_removes_row_and_file() {
    let env = TestEnv::new().await;
    let app = create_test_app(&env).await;
    let admin = env.admin_token();
    let product_id = create_product(&app, &admin, "Clock").await;
    let images = upload_images(
        &app,
        &admin,
        &product_id,
        &[Part::image("a.png"), Part::image("b.png")],
    )
    .await;
    let uri = format!("/api/products/{}/images/{}", product_id, images[0]["id"].as_str().unwrap());

    let (status, body) = send_json(&app, Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Image deleted successfully");
    assert_eq!(env.stored_files(), vec![filename_of(&images[1]["url"])]);

    let (status, body) = send_json(&app, Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Image not found for this product");
}

/// Deleting the row succeeds even when its file is already gone.
#[actix_rt::test]
async fn test_delete_image_with_missing_file() {
    let env = TestEnv::new().await;
    let app = create_test_app(&env).await;
    let admin = env.admin_token();
    let product_id = create_product(&app, &admin, "Frame").await;
    let images = upload_images(&app, &admin, &product_id, &[Part::image("a.png")]).await;

    std::fs::remove_file(env.store.dir().join(filename_of(&images[0]["url"]))).unwrap();

    let (status, _) = send_json(
        &app,
        Method::DELETE,
        &format!("/api/products/{}/images/{}", product_id, images[0]["id"].as_str().unwrap()),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, 200);
}

#[actix_rt::test]
async fn test_delete_product_removes_image_files() {
    let env = TestEnv::new().await;
    let app = create_test_app(&env).await;
    let admin = env.admin_token();
    let product_id = create_product(&app, &admin, "Bench").await;
    let kept_id = create_product(&app, &admin, "Stool").await;
    upload_images(
        &app,
        &admin,
        &product_id,
        &[Part::image("a.png"), Part::image("b.png")],
    )
    .await;
    let kept = upload_images(&app, &admin, &kept_id, &[Part::image("c.png")]).await;

    let (status, body) = send_json(
        &app,
        Method::DELETE,
        &format!("/api/products/{}", product_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Product deleted successfully");
    assert_eq!(env.stored_files(), vec![filename_of(&kept[0]["url"])]);

    let (status, _) = send_json(
        &app,
        Method::GET,
        &format!("/api/products/{}", product_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_list_without_images_is_not_found() {
    let env = TestEnv::new().await;
    let app = create_test_app(&env).await;
    let admin = env.admin_token();
    let product_id = create_product(&app, &admin, "Box").await;

    let (status, body) = send_json(
        &app,
        Method::GET,
        &format!("/api/products/{}/images", product_id),
        Some(&env.customer_token()),
        None,
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "No images found for this product");
}

#[actix_rt::test]
async fn test_get_image_checks_product_and_auth() {
    let env = TestEnv::new().await;
    let app = create_test_app(&env).await;
    let admin = env.admin_token();
    let product_id = create_product(&app, &admin, "Plant").await;
    let images = upload_images(&app, &admin, &product_id, &[Part::image("a.png")]).await;
    let image_id = images[0]["id"].as_str().unwrap();

    let (status, body) = send_json(
        &app,
        Method::GET,
        &format!("/api/products/{}/images/{}", product_id, image_id),
        Some(&env.customer_token()),
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["id"], image_id);
    assert_eq!(body["product"]["id"], product_id.as_str());

    let (status, body) = send_json(
        &app,
        Method::GET,
        &format!("/api/products/{}/images/{}", Uuid::new_v4(), image_id),
        Some(&env.customer_token()),
        None,
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Image not found");

    let (status, _) = send_json(
        &app,
        Method::GET,
        &format!("/api/products/{}/images/{}", product_id, image_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, 401);
}

#[actix_rt::test]
async fn test_malformed_ids_are_bad_requests() {
    let env = TestEnv::new().await;
    let app = create_test_app(&env).await;

    let (status, _) = send_json(
        &app,
        Method::GET,
        "/api/products/not-a-uuid/images",
        Some(&env.admin_token()),
        None,
    )
    .await;
    assert_eq!(status, 400);
}
