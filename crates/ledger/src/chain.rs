// Path: crates/ledger/src/chain.rs
//! The hash chain.

use crate::journal::{self, JournalWriter};
use crate::mining::mine;
use crate::verify::verify_blocks;
use medchain_crypto::HashFunction;
use medchain_telemetry::{ledger_metrics, time::MiningTimer};
use medchain_types::app::{Block, ChainInfo, Clock, MedicalRecord};
use medchain_types::config::LedgerConfig;
use medchain_types::error::LedgerError;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Block history plus a copy of the newest block, so the tip is always
/// available without an `Option`.
#[derive(Debug)]
struct ChainState {
    blocks: Vec<Block>,
    tip: Block,
}

impl ChainState {
    fn new(genesis: Block) -> Self {
        Self {
            blocks: vec![genesis.clone()],
            tip: genesis,
        }
    }

    fn from_blocks(blocks: Vec<Block>) -> Option<Self> {
        let tip = blocks.last()?.clone();
        Some(Self { blocks, tip })
    }

    fn push(&mut self, block: Block) {
        self.tip = block.clone();
        self.blocks.push(block);
    }
}

/// The append-only ledger of medical records.
///
/// `append` is the only mutator. Concurrent appends are serialized by
/// `append_lock`; mining runs while holding only that lock, and the chain
/// `RwLock` is taken for writing just long enough to push the sealed block.
#[derive(Debug)]
pub struct Ledger {
    config: LedgerConfig,
    hasher: Arc<dyn HashFunction>,
    clock: Arc<dyn Clock>,
    chain: RwLock<ChainState>,
    /// Serializes appends and owns the journal writer, if any.
    append_lock: Mutex<Option<JournalWriter>>,
}

impl Ledger {
    /// Creates an in-memory ledger with a freshly mined genesis block.
    ///
    /// `config.journal_path` is ignored; use [`Ledger::open`] for a durable ledger.
    pub fn new(
        config: LedgerConfig,
        hasher: Arc<dyn HashFunction>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LedgerError> {
        let genesis = mine_genesis(&config, hasher.as_ref(), clock.as_ref())?;
        tracing::info!(
            target: "ledger",
            hash = %genesis.hash,
            fingerprint = hasher.name(),
            difficulty = config.difficulty,
            "Created genesis block"
        );
        ledger_metrics().set_chain_length(1);
        Ok(Self {
            config,
            hasher,
            clock,
            chain: RwLock::new(ChainState::new(genesis)),
            append_lock: Mutex::new(None),
        })
    }

    /// Opens the ledger described by `config`.
    ///
    /// Without a `journal_path` this is [`Ledger::new`]. With one, an existing
    /// journal is replayed and verified, or a new journal is started with a
    /// fresh genesis block. A journal that does not form a valid chain is
    /// rejected with `LedgerError::CorruptJournal`.
    pub fn open(
        config: LedgerConfig,
        hasher: Arc<dyn HashFunction>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LedgerError> {
        let Some(path) = config.journal_path.clone() else {
            return Self::new(config, hasher, clock);
        };

        let blocks = journal::replay(&path)?;
        let mut writer = JournalWriter::open(&path)?;

        let state = match ChainState::from_blocks(blocks) {
            Some(state) => {
                check_loaded(hasher.as_ref(), &state.blocks)?;
                tracing::info!(
                    target: "ledger",
                    path = %path.display(),
                    length = state.blocks.len(),
                    tip = %state.tip.hash,
                    "Replayed ledger journal"
                );
                state
            }
            None => {
                let genesis = mine_genesis(&config, hasher.as_ref(), clock.as_ref())?;
                writer.append(&genesis)?;
                tracing::info!(
                    target: "ledger",
                    path = %path.display(),
                    hash = %genesis.hash,
                    "Started new ledger journal"
                );
                ChainState::new(genesis)
            }
        };

        ledger_metrics().set_chain_length(state.blocks.len() as u64);
        Ok(Self {
            config,
            hasher,
            clock,
            chain: RwLock::new(state),
            append_lock: Mutex::new(Some(writer)),
        })
    }

    /// Mines a block carrying `record` onto the tip and returns its hash.
    ///
    /// Blocks the calling thread for the whole search. Existing blocks are
    /// never removed or reordered. Fails only if the fingerprint backend
    /// fails, a configured mining bound is reached, or the journal write fails;
    /// in each case the chain is left unchanged.
    pub fn append(&self, mut record: MedicalRecord) -> Result<String, LedgerError> {
        let mut journal = self.append_lock.lock();

        let (index, previous_hash) = {
            let chain = self.chain.read();
            (chain.tip.index + 1, chain.tip.hash.clone())
        };
        let timestamp = self.clock.now_ms();
        record.ledger_hash = None;

        let metrics = ledger_metrics();
        let seal = {
            let _timer = MiningTimer::new(metrics);
            mine(
                self.hasher.as_ref(),
                index,
                &previous_hash,
                timestamp,
                &record,
                self.config.difficulty,
                self.config.max_mining_iterations,
            )
        };
        let seal = match seal {
            Ok(seal) => seal,
            Err(e) => {
                tracing::warn!(target: "ledger", index, record_id = %record.id, error = %e, "Mining failed");
                return Err(e);
            }
        };
        metrics.inc_mining_attempts(seal.attempts);

        let block = Block {
            index,
            hash: seal.hash,
            previous_hash,
            timestamp,
            payload: record,
            nonce: seal.nonce,
        };

        if let Some(writer) = journal.as_mut() {
            writer.append(&block)?;
        }

        let hash = block.hash.clone();
        tracing::info!(
            target: "ledger",
            index,
            hash = %hash,
            nonce = block.nonce,
            attempts = seal.attempts,
            record_id = %block.payload.id,
            patient_id = %block.payload.patient_id,
            kind = %block.payload.kind,
            "Appended block"
        );

        let length = {
            let mut chain = self.chain.write();
            chain.push(block);
            chain.blocks.len() as u64
        };
        metrics.inc_blocks_appended();
        metrics.set_chain_length(length);
        Ok(hash)
    }

    /// Every record whose `patient_id` matches, in chain order, with `ledger_hash` set.
    pub fn records_by_patient(&self, patient_id: &str) -> Vec<MedicalRecord> {
        self.collect_records(|r| r.patient_id == patient_id)
    }

    /// Every record whose `doctor_id` matches, in chain order, with `ledger_hash` set.
    ///
    /// An empty `doctor_id` matches nothing, so unassigned records are never
    /// attributed to anyone.
    pub fn records_by_doctor(&self, doctor_id: &str) -> Vec<MedicalRecord> {
        if doctor_id.is_empty() {
            return Vec::new();
        }
        self.collect_records(|r| r.doctor_id == doctor_id)
    }

    /// Looks a record up by its id. The genesis sentinel is not a record.
    pub fn record(&self, record_id: &str) -> Option<MedicalRecord> {
        let chain = self.chain.read();
        chain
            .blocks
            .iter()
            .skip(1)
            .find(|b| b.payload.id == record_id)
            .map(Block::record)
    }

    fn collect_records(&self, mut pred: impl FnMut(&MedicalRecord) -> bool) -> Vec<MedicalRecord> {
        let chain = self.chain.read();
        chain
            .blocks
            .iter()
            .skip(1)
            .filter(|b| pred(&b.payload))
            .map(Block::record)
            .collect()
    }

    /// Recomputes every block's fingerprint and link, genesis included. True
    /// only if all pass.
    pub fn verify(&self) -> bool {
        let chain = self.chain.read();
        self.check(&chain.blocks)
    }

    fn check(&self, blocks: &[Block]) -> bool {
        match verify_blocks(self.hasher.as_ref(), blocks) {
            Ok(()) => true,
            Err(fault) => {
                tracing::warn!(target: "ledger", %fault, "Chain verification failed");
                ledger_metrics().inc_verification_failures();
                false
            }
        }
    }

    /// Length, validity and tip, observed under a single read lock.
    pub fn chain_info(&self) -> ChainInfo {
        let chain = self.chain.read();
        ChainInfo {
            length: chain.blocks.len() as u64,
            is_valid: self.check(&chain.blocks),
            last_block: chain.tip.clone(),
        }
    }

    pub fn block(&self, index: u64) -> Option<Block> {
        let position = usize::try_from(index).ok()?;
        self.chain.read().blocks.get(position).cloned()
    }

    pub fn block_by_hash(&self, hash: &str) -> Option<Block> {
        self.chain
            .read()
            .blocks
            .iter()
            .find(|b| b.hash == hash)
            .cloned()
    }

    /// Number of blocks, genesis included.
    pub fn len(&self) -> u64 {
        self.chain.read().blocks.len() as u64
    }

    /// Always false: a ledger holds at least its genesis block.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// A snapshot copy of the full history.
    pub fn blocks(&self) -> Vec<Block> {
        self.chain.read().blocks.clone()
    }

    pub fn last_block(&self) -> Block {
        self.chain.read().tip.clone()
    }

    pub fn difficulty(&self) -> u32 {
        self.config.difficulty
    }

    pub fn hasher(&self) -> &Arc<dyn HashFunction> {
        &self.hasher
    }
}

fn mine_genesis(
    config: &LedgerConfig,
    hasher: &dyn HashFunction,
    clock: &dyn Clock,
) -> Result<Block, LedgerError> {
    let timestamp = clock.now_ms();
    let payload = MedicalRecord::genesis(timestamp);
    let seal = mine(
        hasher,
        0,
        "",
        timestamp,
        &payload,
        config.difficulty,
        config.max_mining_iterations,
    )?;
    Ok(Block {
        index: 0,
        hash: seal.hash,
        previous_hash: String::new(),
        timestamp,
        payload,
        nonce: seal.nonce,
    })
}

fn check_loaded(hasher: &dyn HashFunction, blocks: &[Block]) -> Result<(), LedgerError> {
    verify_blocks(hasher, blocks).map_err(|fault| LedgerError::CorruptJournal(fault.to_string()))
}
