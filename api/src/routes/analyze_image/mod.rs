pub mod analyze_image_route;
