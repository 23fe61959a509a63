use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        addresses::{AddressList, CreateAddressRequest},
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddToCartRequest, CartItemDto, CartList},
        catalog::{
            CategoryList, CreateCategoryRequest, HomeFeed, InfluencerDetail, InfluencerList,
            SearchResults,
        },
        dashboard::{
            InfluencerDashboard, RevenueStats, SoldProductRow, SoldProductsReport, TopProduct,
            TopProductList,
        },
        orders::{CheckoutRequest, OrderList, OrderWithItems},
        products::{
            CreateProductRequest, InfluencerProducts, ProductDetail, ProductList,
            ProductSummaryList, RatedProduct, UpdateProductRequest,
        },
        profile::{ProfileView, UpdateProfileRequest},
        reviews::{MyReview, ReviewList, SubmitReviewRequest},
        videos::{LinkProductsRequest, UploadVideoRequest, VideoCounters, VideoList},
        wishlist::{AddWishlistRequest, WishlistProductList},
    },
    models::{
        Address, CartItem, Category, InfluencerCard, InfluencerProfile, Order, OrderItem,
        OrderStatus, Product, ProductSummary, Review, ReviewWithAuthor, Role, User, Video,
        WishlistItem,
    },
    response::{ApiResponse, Empty, Meta},
    routes::{
        addresses, auth, cart, catalog, health, influencer, influencers, orders, products,
        reports, videos, wishlist,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::me,
        catalog::home,
        catalog::customer_dashboard,
        catalog::search,
        catalog::list_categories,
        catalog::create_category,
        products::list_products,
        products::get_product,
        products::list_reviews,
        products::my_review,
        products::submit_review,
        influencers::list_influencers,
        influencers::influencer_detail,
        influencers::influencer_products,
        influencers::influencer_videos,
        influencer::dashboard,
        influencer::get_profile,
        influencer::update_profile,
        influencer::list_my_products,
        influencer::create_product,
        influencer::update_product,
        influencer::delete_product,
        influencer::list_my_videos,
        influencer::upload_video,
        influencer::set_video_products,
        influencer::deactivate_video,
        influencer::sold_products,
        videos::record_view,
        videos::like_video,
        reports::top_products,
        cart::cart_list,
        cart::add_to_cart,
        cart::remove_from_cart,
        wishlist::list_wishlist,
        wishlist::add_to_wishlist,
        wishlist::remove_from_wishlist,
        addresses::list_addresses,
        addresses::create_address,
        addresses::delete_address,
        orders::list_orders,
        orders::checkout,
        orders::get_order,
        orders::cancel_order
    ),
    components(
        schemas(
            Role,
            OrderStatus,
            User,
            InfluencerProfile,
            InfluencerCard,
            Category,
            Product,
            ProductSummary,
            Review,
            ReviewWithAuthor,
            Video,
            CartItem,
            WishlistItem,
            Address,
            Order,
            OrderItem,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateCategoryRequest,
            CategoryList,
            HomeFeed,
            SearchResults,
            InfluencerList,
            InfluencerDetail,
            ProfileView,
            UpdateProfileRequest,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            ProductSummaryList,
            ProductDetail,
            RatedProduct,
            InfluencerProducts,
            SubmitReviewRequest,
            ReviewList,
            MyReview,
            UploadVideoRequest,
            LinkProductsRequest,
            VideoList,
            VideoCounters,
            InfluencerDashboard,
            TopProduct,
            TopProductList,
            SoldProductRow,
            RevenueStats,
            SoldProductsReport,
            AddToCartRequest,
            CartItemDto,
            CartList,
            AddWishlistRequest,
            WishlistProductList,
            CreateAddressRequest,
            AddressList,
            CheckoutRequest,
            OrderWithItems,
            OrderList,
            Empty,
            Meta,
            ApiResponse<Product>,
            ApiResponse<OrderWithItems>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and current user"),
        (name = "Catalog", description = "Home feed, categories and search"),
        (name = "Products", description = "Product browsing"),
        (name = "Reviews", description = "Product reviews"),
        (name = "Influencers", description = "Public influencer storefronts"),
        (name = "Influencer", description = "Influencer self-service: products, videos, analytics"),
        (name = "Videos", description = "Video view and like counters"),
        (name = "Reports", description = "Cross-catalog sales reports"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Wishlist", description = "Wishlist endpoints"),
        (name = "Addresses", description = "Shipping addresses"),
        (name = "Orders", description = "Checkout and order history"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/auth/me",
            "/api/products/{id}/reviews",
            "/api/influencer/sold-products",
            "/api/influencer/videos/{id}/products",
            "/api/reports/top-products",
            "/api/orders/{id}/cancel",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let schemes = doc.components.map(|c| c.security_schemes).unwrap_or_default();
        assert!(schemes.contains_key("bearer_auth"));
    }
}
