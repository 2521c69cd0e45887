mod quote_api;
mod tariff_api;

use std::sync::{Arc, RwLock};

use crate::{
    api::API,
    entities::Tariff,
    error::{unexpected_error, Error},
};

/// Serves quotes from an immutable tariff snapshot. Quotes clone the
/// `Arc` and never see a half-applied change; administrative calls swap in
/// a fully validated replacement.
#[derive(Debug)]
pub struct Engine {
    tariff: RwLock<Arc<Tariff>>,
}

impl Engine {
    #[tracing::instrument(name = "Engine::new", skip_all)]
    pub fn new(tariff: Tariff) -> Result<Self, Error> {
        tariff.validate()?;

        tracing::info!(
            vehicles = tariff.vehicles.len(),
            routes = tariff.popular_routes.len(),
            "tariff loaded"
        );

        Ok(Self {
            tariff: RwLock::new(Arc::new(tariff)),
        })
    }

    pub fn snapshot(&self) -> Result<Arc<Tariff>, Error> {
        let tariff = self.tariff.read().map_err(|_| unexpected_error())?;

        Ok(Arc::clone(&tariff))
    }

    /// Applies `change` to a copy of the live tariff and publishes the copy
    /// if it still validates. Writers are serialized by the lock.
    fn revise<T, F>(&self, change: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Tariff) -> Result<T, Error>,
    {
        let mut live = self.tariff.write().map_err(|_| unexpected_error())?;

        let mut next = Tariff::clone(&live);
        let result = change(&mut next)?;

        if let Err(err) = next.validate() {
            tracing::warn!(code = err.code, "rejected tariff change: {}", err.message);
            return Err(err);
        }

        *live = Arc::new(next);

        Ok(result)
    }
}

impl API for Engine {}

#[test]
fn new_rejects_invalid_tariff() {
    let mut tariff = Tariff::standard();
    tariff.vehicles.clear();

    assert_eq!(Engine::new(tariff).unwrap_err().code, 104);
}

#[test]
fn snapshots_outlive_revisions() {
    use crate::entities::Cents;

    let engine = Engine::new(Tariff::standard()).unwrap();
    let before = engine.snapshot().unwrap();

    engine
        .revise(|tariff| {
            tariff.cancellation_fee = Cents::from_dollars(40);
            Ok(())
        })
        .unwrap();

    assert_eq!(before.cancellation_fee, Cents::from_dollars(25));
    assert_eq!(
        engine.snapshot().unwrap().cancellation_fee,
        Cents::from_dollars(40)
    );
}

#[test]
fn failed_revision_keeps_previous_tariff() {
    use crate::entities::Cents;

    let engine = Engine::new(Tariff::standard()).unwrap();

    let result = engine.revise(|tariff| {
        tariff.cancellation_fee = Cents(-1);
        Ok(())
    });

    assert_eq!(result.unwrap_err().code, 104);
    assert_eq!(*engine.snapshot().unwrap(), Tariff::standard());
}
