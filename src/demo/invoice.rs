use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, anyhow, bail, ensure};
use tracing::debug;

use crate::format::template::template_from_identifier;
use crate::result::result_model::{FeatureInfo, FeatureResult, ScenarioInfo};
use crate::runner::coordinator::{FeatureRunner, RunCoordinator};
use crate::runner::scenario::Scenario;
use crate::step::context::StepContext;
use crate::step::error::StepIgnored;
use crate::step::step_model::Step;

// ============================================================================
// In-memory shop used by the demo steps
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub customer: String,
    pub product: String,
    pub price: u32,
}

/// Product storage, basket and sent invoices shared by the steps of one
/// scenario.
#[derive(Debug, Default)]
pub struct Shop {
    prices: Mutex<HashMap<String, u32>>,
    basket: Mutex<Option<String>>,
    invoices: Mutex<Vec<Invoice>>,
}

impl Shop {
    pub fn new() -> Arc<Self> {
        Arc::new(Shop::default())
    }

    pub fn stock(&self, product: &str, price: u32) {
        self.prices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(product.to_string(), price);
    }

    pub fn select(&self, product: &str) {
        *self.basket.lock().unwrap_or_else(PoisonError::into_inner) = Some(product.to_string());
    }

    pub fn selected(&self) -> Option<String> {
        self.basket
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn buy(&self, customer: &str, product: &str) -> anyhow::Result<Invoice> {
        let price = self
            .prices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(product)
            .copied()
            .with_context(|| format!("product '{}' is not in storage", product))?;
        let invoice = Invoice {
            customer: customer.to_string(),
            product: product.to_string(),
            price,
        };
        self.invoices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(invoice.clone());
        Ok(invoice)
    }

    pub fn invoices_for(&self, customer: &str) -> Vec<Invoice> {
        self.invoices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|i| i.customer == customer)
            .cloned()
            .collect()
    }
}

// ============================================================================
// Invoice feature
// ============================================================================

pub fn invoice_feature() -> FeatureInfo {
    FeatureInfo::new("Invoice feature")
        .with_description(
            "In order to pay for products\nAs a customer\nI want to receive invoice for bought items",
        )
        .with_label("Story-1")
}

/// Scenarios executed by the demo, in declaration order.
pub fn invoice_scenarios() -> Vec<Scenario> {
    vec![
        receiving_invoice_for_products(),
        paying_with_an_expired_card(),
        applying_a_seasonal_discount(),
    ]
}

/// Scenarios declared by the feature but not executed, with the reason.
pub fn skipped_scenarios() -> Vec<(Scenario, &'static str)> {
    vec![(
        Scenario::from_info(ScenarioInfo::new("Wrapping a gift").with_label("Ticket-4"))
            .step(Step::new("given", "customer selects gift wrapping", || Ok(())))
            .step(Step::new("then", "product is wrapped", || Ok(()))),
        "gift wrapping is not offered yet",
    )]
}

fn receiving_invoice_for_products() -> Scenario {
    let shop = Shop::new();
    let (stocked, selecting, buying, invoiced, checking) = (
        Arc::clone(&shop),
        Arc::clone(&shop),
        Arc::clone(&shop),
        Arc::clone(&shop),
        Arc::clone(&shop),
    );

    let product_names = ["product", "price"];
    Scenario::from_info(
        ScenarioInfo::new("Receiving invoice for products")
            .with_label("Ticket-1")
            .with_category("Sales"),
    )
    .step(
        Step::new(
            "given",
            template_from_identifier(
                "product_is_available_in_products_storage_for_PRICE_pounds",
                &product_names,
            ),
            move || {
                stocked.stock("wooden desk", 62);
                Ok(())
            },
        )
        .param("product", "wooden desk")
        .param("price", 62u32),
    )
    .step(
        Step::new("given", "customer puts {} into the basket", move || {
            selecting.select("wooden desk");
            Ok(())
        })
        .param("product", "wooden desk"),
    )
    // The basket is read when the step starts, so the name shows what was bought.
    .step(Step::deferred(
        "when",
        "customer {customer} buys {product}",
        &["customer", "product"],
        move || {
            let product = buying
                .selected()
                .ok_or_else(|| anyhow!("basket is empty"))?;
            Ok(("Joe".to_string(), product))
        },
        move |(customer, product): (String, String), ctx: &mut StepContext| {
            let invoice = invoiced.buy(&customer, &product)?;
            ctx.comment(format!("invoice total: {} pounds", invoice.price));
            Ok(())
        },
    ))
    .step(Step::deferred(
        "then",
        template_from_identifier(
            "invoice_should_contain_product_with_price_of_AMOUNT_pounds",
            &["product", "amount"],
        ),
        &["product", "amount"],
        || Ok(("wooden desk", 62u32)),
        move |(product, amount): (&'static str, u32), _: &mut StepContext| {
            let invoices = checking.invoices_for("Joe");
            let invoice = invoices
                .first()
                .ok_or_else(|| anyhow!("no invoice was sent"))?;
            ensure!(invoice.product == product, "invoice is for '{}'", invoice.product);
            ensure!(invoice.price == amount, "invoice price is {}", invoice.price);
            Ok(())
        },
    ))
}

fn paying_with_an_expired_card() -> Scenario {
    Scenario::from_info(ScenarioInfo::new("Paying with an expired card").with_label("Ticket-2"))
        .step(
            Step::new("given", "customer has card {number} expiring {expiry}", || Ok(()))
                .param("number", "4111-1111")
                .param("expiry", "01/20"),
        )
        .step(
            Step::new("when", "customer pays {} pounds", || {
                bail!("card 4111-1111 expired on 01/20")
            })
            .param("amount", 62u32),
        )
        .step(Step::new("then", "order is confirmed", || Ok(())))
}

fn applying_a_seasonal_discount() -> Scenario {
    Scenario::from_info(
        ScenarioInfo::new("Applying a seasonal discount")
            .with_label("Ticket-3")
            .with_category("Sales"),
    )
    .step(
        Step::new("given", "discount code {} exists", || Ok(()))
            .param("code", "WINTER"),
    )
    .step(Step::new("when", "customer applies the code", || {
        Err(StepIgnored::new("seasonal discounts are disabled").into())
    }))
    .step(Step::with_context("then", "price is unchanged", |ctx| {
        ctx.comment("discount was not applied");
        Ok(())
    }))
}

// ============================================================================
// Demo run
// ============================================================================

/// Run the invoice feature on `parallel` threads and finish it.
///
/// Scenarios are dealt round-robin to the threads; each thread runs its
/// share in order.
pub fn run_invoice_feature(
    coordinator: &RunCoordinator,
    parallel: usize,
) -> anyhow::Result<Arc<FeatureResult>> {
    let feature = coordinator.feature(invoice_feature())?;

    let mut lanes: Vec<Vec<Scenario>> = (0..parallel.max(1)).map(|_| Vec::new()).collect();
    let lane_count = lanes.len();
    for (i, scenario) in invoice_scenarios().into_iter().enumerate() {
        lanes[i % lane_count].push(scenario);
    }

    std::thread::scope(|scope| -> anyhow::Result<()> {
        let handles: Vec<_> = lanes
            .into_iter()
            .enumerate()
            .map(|(lane, scenarios)| {
                let feature = &feature;
                scope.spawn(move || run_lane(feature, lane, scenarios))
            })
            .collect();
        for handle in handles {
            handle
                .join()
                .map_err(|_| anyhow!("scenario thread panicked"))??;
        }
        Ok(())
    })?;

    for (scenario, reason) in skipped_scenarios() {
        feature.skip_scenario(scenario, reason)?;
    }

    Ok(feature.finish())
}

fn run_lane(feature: &FeatureRunner, lane: usize, scenarios: Vec<Scenario>) -> anyhow::Result<()> {
    for scenario in scenarios {
        debug!(lane, scenario = %scenario.info().name, "running scenario");
        feature.run_scenario(scenario)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shop_rejects_unknown_products() {
        let shop = Shop::new();
        assert!(shop.buy("Joe", "chair").is_err());
        shop.stock("chair", 10);
        assert_eq!(shop.buy("Joe", "chair").unwrap().price, 10);
        assert_eq!(shop.invoices_for("Joe").len(), 1);
        assert!(shop.invoices_for("Ann").is_empty());
    }
}
