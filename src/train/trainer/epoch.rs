//! Epoch loop, best-model tracking and the final test

use super::core::{IqaTrainer, SplitLoaders};
use super::result::{BestRecord, EpochReport, PhaseResult, TrainOutcome};
use crate::data::DataLoader;
use crate::eval::{evaluate_split, SplitEvaluation};
use crate::io::{load_state_dict, save_full_model, save_state_dict, ResultsReport, TestRecord};
use crate::model::IqaModel;
use crate::Result;
use std::time::Instant;

impl<M: IqaModel> IqaTrainer<M> {
    /// Train for `n_epochs`, then test the best model
    ///
    /// After every epoch the model is evaluated on the validation split (and
    /// on the test split when testing during training). Once past the warm-up
    /// window, a lower validation loss replaces the best model: the results
    /// report, the test record, the parameter snapshot and the full model are
    /// rewritten.
    pub fn run(&mut self, loaders: &mut SplitLoaders) -> Result<TrainOutcome> {
        let start = Instant::now();
        let mut epochs = Vec::with_capacity(self.config.n_epochs);
        let mut best = None;

        for epoch in 0..self.config.n_epochs {
            let train_loss = self.train_epoch(&mut loaders.train)?;

            self.model.eval();
            let val = evaluate_split(&self.model, &mut loaders.val)?;
            let test = match loaders.test.as_mut() {
                Some(test_loader) if self.config.test_during_training => {
                    Some(evaluate_split(&self.model, test_loader)?)
                }
                _ => None,
            };

            self.record_scalars(epoch, train_loss, &val, test.as_ref())?;
            log::debug!(
                "epoch {epoch}: train loss={train_loss:.4}, val loss={:.4}, val SROCC={:.4}",
                val.loss,
                val.measures.srocc
            );

            let best_updated = val.loss < self.best_val_loss && self.config.past_warmup(epoch);
            if best_updated {
                best = Some(self.update_best(epoch, &val, test.as_ref(), &loaders.test_index)?);
            }

            epochs.push(EpochReport {
                epoch,
                train_loss,
                val: PhaseResult::from(&val),
                test: test.as_ref().map(PhaseResult::from),
                best_updated,
            });
        }

        let test = match loaders.test.as_mut() {
            Some(test_loader) => Some(self.final_test(test_loader, &loaders.test_index)?),
            None => None,
        };

        Ok(TrainOutcome { epochs, best, test, elapsed_secs: start.elapsed().as_secs_f64() })
    }

    fn record_scalars(
        &mut self,
        epoch: usize,
        train_loss: f32,
        val: &SplitEvaluation,
        test: Option<&SplitEvaluation>,
    ) -> Result<()> {
        let Some(loggers) = self.loggers.as_mut() else {
            return Ok(());
        };
        let step = epoch as u64;
        loggers.train.scalar_summary("loss", f64::from(train_loss), step)?;
        loggers.val.log_evaluation(val.loss, &val.measures, step)?;
        if let (Some(logger), Some(test)) = (loggers.test.as_mut(), test) {
            logger.log_evaluation(test.loss, &test.measures, step)?;
        }
        Ok(())
    }

    fn update_best(
        &mut self,
        epoch: usize,
        val: &SplitEvaluation,
        test: Option<&SplitEvaluation>,
        test_index: &[String],
    ) -> Result<BestRecord> {
        let report = ResultsReport {
            exp_id: self.config.exp_id,
            epoch,
            val_loss: val.loss,
            val: val.measures,
            test: test.map(|t| (t.loss, t.measures)),
        };
        log::info!("{}", report.headline());
        log::info!("{}", val.measures.summary("val", val.loss));
        if let Some(test) = test {
            log::info!("{}", test.measures.summary("test", test.loss));
        }
        report.write(self.paths.report())?;

        if let Some(test) = test {
            TestRecord::from_evaluation(test, test_index).save(self.paths.test_record())?;
        }

        save_state_dict(&self.model, self.paths.snapshot())?;
        save_full_model(&self.model, self.paths.full_model())?;
        self.snapshot_written = true;
        self.best_val_loss = val.loss;

        Ok(BestRecord {
            epoch,
            val: PhaseResult::from(val),
            test: test.map(PhaseResult::from),
        })
    }

    fn final_test(
        &mut self,
        loader: &mut DataLoader,
        test_index: &[String],
    ) -> Result<SplitEvaluation> {
        if self.snapshot_written {
            load_state_dict(&mut self.model, self.paths.snapshot())?;
        } else {
            log::warn!(
                "no best model was saved during training; testing the final weights instead"
            );
        }
        self.model.set_requires_grad(false);
        self.model.eval();

        let test = evaluate_split(&self.model, loader)?;
        log::info!("{}", test.measures.summary("test", test.loss));
        TestRecord::from_evaluation(&test, test_index).save(self.paths.test_record())?;
        Ok(test)
    }
}
