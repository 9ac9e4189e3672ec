//! Checkout order assembly.
//!
//! Turns the front end's checkout payload into an [`OrderRequest`]:
//!
//! 1. Buyer from `billing`, with `contact_name` split into first/last name
//! 2. Basket lines from `cart`, total summed in exact decimal arithmetic
//! 3. Callback/success/failure URLs from the request's own origin
//! 4. Payment-method selection merged from `payment_methods` and `payment_options`
//! 5. Shipping address from `shipping`, or copied from the buyer
//! 6. Metadata: `cart_items_count`, `application_name`, `selected_installment`,
//!    then any non-reserved client entries

use paygate_core::{
    ConversationId, CurrencyCode, NumericInput, ValidationError, compute_basket_total,
    new_short_item_id, parse_price, parse_quantity,
};
use serde::Deserialize;

use super::{ReturnUrls, non_blank, required};
use crate::config::CheckoutDefaults;
use crate::gateway::{
    BasketItem, BillingAddress, Buyer, MetadataEntry, OrderRequest, PHYSICAL_ITEM,
    ShippingAddress,
};

/// Last name used when `contact_name` is a single word.
pub const PLACEHOLDER_LAST_NAME: &str = "User";

/// Description used when the client sends none.
pub const DEFAULT_DESCRIPTION: &str = "Checkout order";

/// Metadata keys the facade owns; client entries with these keys are dropped.
pub const RESERVED_METADATA_KEYS: [&str; 3] =
    ["cart_items_count", "application_name", "selected_installment"];

/// Checkout payload as sent by the front end.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutInput {
    pub billing: Option<BillingInput>,
    pub cart: Option<Vec<CartLineInput>>,
    pub currency: Option<String>,
    pub locale: Option<String>,
    pub description: Option<String>,
    pub conversation_id: Option<String>,
    pub three_d_force: Option<bool>,
    pub payment_methods: Option<PaymentMethodsInput>,
    pub payment_options: Option<Vec<String>>,
    pub enabled_installments: Option<Vec<u32>>,
    pub shipping: Option<ShippingInput>,
    pub same_address: Option<bool>,
    pub installment: Option<NumericInput>,
    pub metadata: Option<Vec<MetadataEntry>>,
}

/// `billing` object of a checkout payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BillingInput {
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub contact_phone: Option<String>,
    pub vat_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
}

/// `shipping` object of a checkout payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShippingInput {
    pub contact_name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
}

/// One entry of `cart`. Client item IDs are not forwarded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CartLineInput {
    pub name: Option<String>,
    pub price: Option<NumericInput>,
    pub quantity: Option<NumericInput>,
    pub category: Option<String>,
}

/// Legacy `payment_methods` field: either a flag or a list of options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PaymentMethodsInput {
    Flag(bool),
    List(Vec<String>),
}

/// Split a contact name on its first space.
///
/// `"Ada Lovelace"` gives `("Ada", "Lovelace")`; `"Ada"` alone gives
/// `("Ada", "User")`. Everything after the first space is the last name.
#[must_use]
pub fn split_contact_name(contact_name: &str) -> (String, String) {
    let trimmed = contact_name.trim();
    match trimmed.split_once(' ') {
        Some((first, rest)) if !rest.trim().is_empty() => {
            (first.to_string(), rest.trim().to_string())
        }
        _ => (trimmed.to_string(), PLACEHOLDER_LAST_NAME.to_string()),
    }
}

/// Resolved payment-method selection.
#[derive(Debug, Default, PartialEq, Eq)]
struct PaymentSelection {
    all_methods: bool,
    options: Vec<String>,
}

/// `payment_methods: true` sets the flag, a `payment_methods` list supplies
/// options, and an explicit `payment_options` list replaces those options.
fn resolve_payment_methods(
    legacy: Option<PaymentMethodsInput>,
    options: Option<Vec<String>>,
) -> PaymentSelection {
    let mut selection = match legacy {
        Some(PaymentMethodsInput::Flag(all_methods)) => PaymentSelection {
            all_methods,
            options: Vec::new(),
        },
        Some(PaymentMethodsInput::List(options)) => PaymentSelection {
            all_methods: false,
            options,
        },
        None => PaymentSelection::default(),
    };

    if let Some(options) = options {
        selection.options = options;
    }
    selection
        .options
        .retain(|option| !option.trim().is_empty());
    selection
}

fn build_buyer(
    billing: Option<BillingInput>,
    defaults: &CheckoutDefaults,
) -> Result<(Buyer, BillingAddress), ValidationError> {
    let billing = billing.ok_or_else(|| ValidationError::missing("billing"))?;

    let contact_name = required("billing.contact_name", billing.contact_name)?;
    let email = required("billing.email", billing.email)?;
    let phone = non_blank(billing.contact_phone);
    let national_id = non_blank(billing.vat_number);
    let city = non_blank(billing.city);
    let address = non_blank(billing.address);
    let zip = non_blank(billing.zip_code);

    let (first_name, last_name) = split_contact_name(&contact_name);

    let billing_address = BillingAddress {
        contact_name,
        contact_phone: phone.clone(),
        city: city.clone(),
        country: defaults.country.clone(),
        address: address.clone(),
        zip: zip.clone(),
        vat_number: national_id.clone(),
    };

    let buyer = Buyer {
        first_name,
        last_name,
        email,
        phone,
        national_id,
        city,
        address,
        zip,
        country: defaults.country.clone(),
    };

    Ok((buyer, billing_address))
}

fn build_basket(
    cart: Option<Vec<CartLineInput>>,
) -> Result<(Vec<BasketItem>, rust_decimal::Decimal), ValidationError> {
    let cart = cart.ok_or_else(|| ValidationError::missing("cart"))?;
    if cart.is_empty() {
        return Err(ValidationError::EmptyCart);
    }

    let mut lines = Vec::with_capacity(cart.len());
    let mut items = Vec::with_capacity(cart.len());
    for (index, line) in cart.into_iter().enumerate() {
        let name = required(&format!("cart[{index}].name"), line.name)?;
        let price = line
            .price
            .ok_or_else(|| ValidationError::missing(format!("cart[{index}].price")))?;
        let quantity = line
            .quantity
            .ok_or_else(|| ValidationError::missing(format!("cart[{index}].quantity")))?;

        items.push(BasketItem {
            id: new_short_item_id(),
            name,
            price: parse_price(&format!("cart[{index}].price"), &price)?,
            quantity: parse_quantity(&format!("cart[{index}].quantity"), &quantity)?,
            item_type: PHYSICAL_ITEM.to_string(),
            category: non_blank(line.category),
        });
        lines.push((price, quantity));
    }

    let total = compute_basket_total(lines.iter().map(|(price, quantity)| (price, quantity)))?;
    Ok((items, total))
}

fn build_shipping(
    shipping: Option<ShippingInput>,
    same_address: Option<bool>,
    buyer: &Buyer,
    billing: &BillingAddress,
) -> ShippingAddress {
    match shipping {
        Some(shipping) if same_address != Some(true) => ShippingAddress {
            contact_name: non_blank(shipping.contact_name)
                .unwrap_or_else(|| billing.contact_name.clone()),
            city: non_blank(shipping.city),
            country: buyer.country.clone(),
            address: non_blank(shipping.address),
            zip: non_blank(shipping.zip_code),
        },
        _ => ShippingAddress {
            contact_name: billing.contact_name.clone(),
            city: buyer.city.clone(),
            country: buyer.country.clone(),
            address: buyer.address.clone(),
            zip: buyer.zip.clone(),
        },
    }
}

fn build_metadata(
    cart_items: usize,
    installment: Option<&NumericInput>,
    client: Option<Vec<MetadataEntry>>,
    defaults: &CheckoutDefaults,
) -> Result<Vec<MetadataEntry>, ValidationError> {
    let mut metadata = vec![
        MetadataEntry::new("cart_items_count", cart_items.to_string()),
        MetadataEntry::new("application_name", defaults.application_name.clone()),
    ];

    if let Some(installment) = installment {
        let count = parse_quantity("installment", installment)?;
        metadata.push(MetadataEntry::new("selected_installment", count.to_string()));
    }

    metadata.extend(
        client
            .unwrap_or_default()
            .into_iter()
            .filter(|entry| !entry.key.trim().is_empty())
            .filter(|entry| !RESERVED_METADATA_KEYS.contains(&entry.key.as_str())),
    );
    Ok(metadata)
}

/// Validate a checkout payload and build the gateway order.
///
/// # Errors
///
/// Returns a [`ValidationError`] if `billing` lacks a contact name or email,
/// `cart` is missing or empty, any cart line lacks a name, price or quantity
/// or holds a non-numeric one, the currency is not a three-letter code, or
/// `installment` is not a positive integer.
pub fn assemble_order(
    input: CheckoutInput,
    urls: &ReturnUrls,
    defaults: &CheckoutDefaults,
) -> Result<OrderRequest, ValidationError> {
    let (buyer, billing_address) = build_buyer(input.billing, defaults)?;
    let (basket_items, amount) = build_basket(input.cart)?;
    let shipping_address =
        build_shipping(input.shipping, input.same_address, &buyer, &billing_address);

    let currency = match non_blank(input.currency) {
        Some(code) => CurrencyCode::parse(&code)?,
        None => defaults.currency.clone(),
    };
    let metadata = build_metadata(
        basket_items.len(),
        input.installment.as_ref(),
        input.metadata,
        defaults,
    )?;
    let payment = resolve_payment_methods(input.payment_methods, input.payment_options);

    Ok(OrderRequest {
        amount,
        currency,
        locale: non_blank(input.locale).unwrap_or_else(|| defaults.locale.clone()),
        description: non_blank(input.description)
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        conversation_id: ConversationId::from_client_or_generate(input.conversation_id.as_deref()),
        buyer,
        basket_items,
        billing_address,
        shipping_address,
        callback_url: urls.callback_url.clone(),
        payment_success_url: urls.success_url.clone(),
        payment_failure_url: urls.failure_url.clone(),
        three_d_force: input.three_d_force.unwrap_or(false),
        payment_methods: payment.all_methods,
        payment_options: payment.options,
        enabled_installments: input.enabled_installments.unwrap_or_default(),
        metadata,
    })
}
