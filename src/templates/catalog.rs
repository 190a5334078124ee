//! Built-in starter templates. Page bodies live in `config/templates/`.

use super::{Template, TemplateCategory};

macro_rules! page {
    ($file:literal) => {
        include_str!(concat!("../../config/templates/", $file))
    };
}

pub static TEMPLATES: &[Template] = &[
    Template {
        id: "modern-business",
        name: "Modern Business",
        description: "Clean, professional business website with modern design",
        category: TemplateCategory::Business,
        tags: &["professional", "clean", "modern", "responsive"],
        preview_url: "/templates/modern-business",
        thumbnail_url: "/images/templates/modern-business.jpg",
        price: 0,
        is_premium: false,
        features: &["Responsive Design", "Contact Form", "About Section", "Services"],
        code: page!("modern-business.html"),
        prompt_examples: &[
            "Create a modern business website for a consulting company",
            "Build a professional website for a law firm",
            "Design a clean business site for a marketing agency",
        ],
    },
    Template {
        id: "ecommerce-store",
        name: "E-commerce Store",
        description: "Full-featured online store with shopping cart and product catalog",
        category: TemplateCategory::Ecommerce,
        tags: &["shop", "products", "cart", "payment"],
        preview_url: "/templates/ecommerce-store",
        thumbnail_url: "/images/templates/ecommerce-store.jpg",
        price: 29,
        is_premium: true,
        features: &["Product Catalog", "Shopping Cart", "Payment Integration", "Inventory Management"],
        code: page!("ecommerce-store.html"),
        prompt_examples: &[
            "Create an online store for handmade jewelry",
            "Build an e-commerce site for electronics",
            "Design a fashion store website",
        ],
    },
    Template {
        id: "portfolio-showcase",
        name: "Portfolio Showcase",
        description: "Beautiful portfolio website for creatives and professionals",
        category: TemplateCategory::Portfolio,
        tags: &["creative", "showcase", "gallery", "personal"],
        preview_url: "/templates/portfolio-showcase",
        thumbnail_url: "/images/templates/portfolio-showcase.jpg",
        price: 0,
        is_premium: false,
        features: &["Project Gallery", "About Section", "Contact Form", "Social Links"],
        code: page!("portfolio-showcase.html"),
        prompt_examples: &[
            "Create a portfolio for a graphic designer",
            "Build a showcase website for a photographer",
            "Design a portfolio for a web developer",
        ],
    },
];
