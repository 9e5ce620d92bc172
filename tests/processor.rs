//! Account-layer rejection tests for `processor::process`.
//!
//! Every path here fails before any CPI, so the accounts are plain
//! `AccountInfo`s over local buffers. Each rejected call must leave the
//! ledger (and record) bytes exactly as they were.

use bytemuck::Zeroable;
use solana_program::account_info::AccountInfo;
use solana_program::entrypoint::ProgramResult;
use solana_program::program_error::ProgramError;
use solana_program::program_option::COption;
use solana_program::program_pack::Pack;
use solana_program::pubkey::Pubkey;
use solana_program::system_program;
use spl_token::state::{Account as TokenAccount, AccountState};
use staking_ledger::error::StakeError;
use staking_ledger::instruction::StakeInstruction;
use staking_ledger::processor;
use staking_ledger::state::{self, StakerRecord, StakingLedger};

// ═══════════════════════════════════════════════════════════════
// Account fixtures
// ═══════════════════════════════════════════════════════════════

struct TestAccount {
    key: Pubkey,
    owner: Pubkey,
    lamports: u64,
    data: Vec<u8>,
    is_signer: bool,
    executable: bool,
}

impl TestAccount {
    fn new(key: Pubkey, owner: Pubkey, data: Vec<u8>) -> Self {
        Self { key, owner, lamports: 0, data, is_signer: false, executable: false }
    }

    fn signer(key: Pubkey) -> Self {
        Self { is_signer: true, lamports: 1_000_000_000, ..Self::new(key, system_program::id(), vec![]) }
    }

    fn program(key: Pubkey) -> Self {
        Self { executable: true, ..Self::new(key, Pubkey::default(), vec![]) }
    }

    fn info(&mut self) -> AccountInfo<'_> {
        AccountInfo::new(
            &self.key,
            self.is_signer,
            true,
            &mut self.lamports,
            &mut self.data,
            &self.owner,
            self.executable,
            0,
        )
    }
}

fn token_account_data(mint: Pubkey, owner: Pubkey, amount: u64) -> Vec<u8> {
    let account = TokenAccount {
        mint,
        owner,
        amount,
        delegate: COption::None,
        state: AccountState::Initialized,
        is_native: COption::None,
        delegated_amount: 0,
        close_authority: COption::None,
    };
    let mut data = vec![0u8; TokenAccount::LEN];
    TokenAccount::pack(account, &mut data).unwrap();
    data
}

fn run(program_id: &Pubkey, accounts: &mut [TestAccount], ix: StakeInstruction) -> ProgramResult {
    let infos: Vec<AccountInfo> = accounts.iter_mut().map(TestAccount::info).collect();
    processor::process(program_id, &infos, &ix.pack())
}

/// An initialized ledger for one mint with one staker, plus every account
/// Stake / RemoveStake expect.
struct Fixture {
    program_id: Pubkey,
    mint: Pubkey,
    staker: Pubkey,
    ledger_key: Pubkey,
    ledger: StakingLedger,
    store: Pubkey,
    custodian: Pubkey,
}

impl Fixture {
    fn new() -> Self {
        let program_id = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let (ledger_key, bump) = state::derive_ledger_pda(&program_id, &mint);
        let (_, store_authority_bump) = state::derive_store_authority(&program_id, &ledger_key);
        let store = Pubkey::new_unique();

        let mut ledger = StakingLedger::zeroed();
        ledger.is_initialized = 1;
        ledger.bump = bump;
        ledger.store_authority_bump = store_authority_bump;
        ledger.owner = Pubkey::new_unique().to_bytes();
        ledger.token_mint = mint.to_bytes();
        ledger.store = store.to_bytes();
        ledger.min_contribution = 5;
        ledger.unstakeable_fee_bps = 9_200;
        ledger.reward_percent = 50;

        Self {
            program_id,
            mint,
            staker: Pubkey::new_unique(),
            ledger_key,
            ledger,
            store,
            custodian: Pubkey::new_unique(),
        }
    }

    fn ledger_account(&self) -> TestAccount {
        TestAccount::new(self.ledger_key, self.program_id, bytemuck::bytes_of(&self.ledger).to_vec())
    }

    fn staker_pda(&self) -> Pubkey {
        state::derive_staker_pda(&self.program_id, &self.ledger_key, &self.staker).0
    }

    fn record(&self, unstakeable: u64) -> StakerRecord {
        let (_, bump) = state::derive_staker_pda(&self.program_id, &self.ledger_key, &self.staker);
        let mut record = StakerRecord::new(self.ledger_key.to_bytes(), self.staker.to_bytes(), bump);
        record.exists = 1;
        record.lifetime_contribution = 100;
        record.contribution = unstakeable;
        record.unstakeable = unstakeable;
        record
    }

    /// [staker, ledger, staker_pda, staker_token, store, token_program, system_program]
    fn stake_accounts(&self, staker_balance: u64) -> Vec<TestAccount> {
        vec![
            TestAccount::signer(self.staker),
            self.ledger_account(),
            TestAccount::new(self.staker_pda(), system_program::id(), vec![]),
            TestAccount::new(
                Pubkey::new_unique(),
                spl_token::id(),
                token_account_data(self.mint, self.staker, staker_balance),
            ),
            TestAccount::new(self.store, spl_token::id(), token_account_data(self.mint, self.custodian, 0)),
            TestAccount::program(spl_token::id()),
            TestAccount::program(system_program::id()),
        ]
    }

    /// [staker, ledger, staker_pda, staker_token, store, store_authority, token_program]
    fn remove_accounts(&self, record: Option<StakerRecord>) -> Vec<TestAccount> {
        let record_account = match record {
            Some(record) => TestAccount::new(
                self.staker_pda(),
                self.program_id,
                bytemuck::bytes_of(&record).to_vec(),
            ),
            None => TestAccount::new(self.staker_pda(), system_program::id(), vec![]),
        };
        let (store_authority, _) = state::derive_store_authority(&self.program_id, &self.ledger_key);
        vec![
            TestAccount::signer(self.staker),
            self.ledger_account(),
            record_account,
            TestAccount::new(Pubkey::new_unique(), spl_token::id(), token_account_data(self.mint, self.staker, 0)),
            TestAccount::new(self.store, spl_token::id(), token_account_data(self.mint, self.custodian, 500)),
            TestAccount::new(store_authority, system_program::id(), vec![]),
            TestAccount::program(spl_token::id()),
        ]
    }
}

const LEDGER: usize = 1;
const RECORD: usize = 2;

fn stake_ix(amount: u64) -> StakeInstruction {
    StakeInstruction::Stake { amount }
}

// ═══════════════════════════════════════════════════════════════
// 0: InitLedger
// ═══════════════════════════════════════════════════════════════

/// [owner, ledger_pda, mint, store, system_program]
fn init_accounts(program_id: &Pubkey, mint: Pubkey) -> Vec<TestAccount> {
    let (ledger_key, _) = state::derive_ledger_pda(program_id, &mint);
    vec![
        TestAccount::signer(Pubkey::new_unique()),
        TestAccount::new(ledger_key, system_program::id(), vec![]),
        TestAccount::new(mint, spl_token::id(), vec![]),
        TestAccount::new(
            Pubkey::new_unique(),
            spl_token::id(),
            token_account_data(mint, Pubkey::new_unique(), 0),
        ),
        TestAccount::program(system_program::id()),
    ]
}

fn init_ix(unstakeable_fee_bps: u16, reward_percent: u16) -> StakeInstruction {
    StakeInstruction::InitLedger { min_contribution: 5, unstakeable_fee_bps, reward_percent }
}

#[test]
fn test_init_requires_owner_signature() {
    let program_id = Pubkey::new_unique();
    let mut accounts = init_accounts(&program_id, Pubkey::new_unique());
    accounts[0].is_signer = false;

    assert_eq!(
        run(&program_id, &mut accounts, init_ix(9_200, 50)),
        Err(ProgramError::MissingRequiredSignature)
    );
}

#[test]
fn test_init_fee_above_denominator_rejected() {
    let program_id = Pubkey::new_unique();
    let mut accounts = init_accounts(&program_id, Pubkey::new_unique());

    assert_eq!(
        run(&program_id, &mut accounts, init_ix(10_001, 50)),
        Err(StakeError::InvalidConfig.into())
    );
    assert!(accounts[LEDGER].data.is_empty());
}

#[test]
fn test_init_reward_above_100_rejected() {
    let program_id = Pubkey::new_unique();
    let mut accounts = init_accounts(&program_id, Pubkey::new_unique());

    assert_eq!(
        run(&program_id, &mut accounts, init_ix(9_200, 101)),
        Err(StakeError::InvalidConfig.into())
    );
}

#[test]
fn test_init_wrong_ledger_address_rejected() {
    let program_id = Pubkey::new_unique();
    let mut accounts = init_accounts(&program_id, Pubkey::new_unique());
    accounts[LEDGER].key = Pubkey::new_unique();

    assert_eq!(
        run(&program_id, &mut accounts, init_ix(9_200, 50)),
        Err(StakeError::InvalidPda.into())
    );
}

#[test]
fn test_init_twice_rejected() {
    let f = Fixture::new();
    let mut accounts = init_accounts(&f.program_id, f.mint);
    accounts[LEDGER] = f.ledger_account();
    let before = accounts[LEDGER].data.clone();

    assert_eq!(
        run(&f.program_id, &mut accounts, init_ix(5_000, 10)),
        Err(StakeError::AlreadyInitialized.into())
    );
    assert_eq!(accounts[LEDGER].data, before);
}

#[test]
fn test_init_store_not_a_token_account_rejected() {
    let program_id = Pubkey::new_unique();
    let mut accounts = init_accounts(&program_id, Pubkey::new_unique());
    accounts[3].owner = system_program::id();

    assert_eq!(
        run(&program_id, &mut accounts, init_ix(9_200, 50)),
        Err(StakeError::InvalidStore.into())
    );
}

#[test]
fn test_init_store_of_other_mint_rejected() {
    let program_id = Pubkey::new_unique();
    let mut accounts = init_accounts(&program_id, Pubkey::new_unique());
    accounts[3].data = token_account_data(Pubkey::new_unique(), Pubkey::new_unique(), 0);

    assert_eq!(
        run(&program_id, &mut accounts, init_ix(9_200, 50)),
        Err(StakeError::InvalidMint.into())
    );
}

// ═══════════════════════════════════════════════════════════════
// 1: Stake
// ═══════════════════════════════════════════════════════════════

/// Run a Stake expected to fail and check nothing on the ledger or record moved.
fn assert_stake_rejected(f: &Fixture, mut accounts: Vec<TestAccount>, amount: u64, expected: ProgramError) {
    let ledger_before = accounts[LEDGER].data.clone();
    let record_before = accounts[RECORD].data.clone();

    assert_eq!(run(&f.program_id, &mut accounts, stake_ix(amount)), Err(expected));
    assert_eq!(accounts[LEDGER].data, ledger_before);
    assert_eq!(accounts[RECORD].data, record_before);
}

#[test]
fn test_stake_requires_staker_signature() {
    let f = Fixture::new();
    let mut accounts = f.stake_accounts(200);
    accounts[0].is_signer = false;
    assert_stake_rejected(&f, accounts, 100, ProgramError::MissingRequiredSignature);
}

#[test]
fn test_stake_short_ledger_data_not_initialized() {
    let f = Fixture::new();
    let mut accounts = f.stake_accounts(200);
    accounts[LEDGER].data = vec![0u8; 10];
    assert_stake_rejected(&f, accounts, 100, StakeError::NotInitialized.into());
}

#[test]
fn test_stake_uninitialized_ledger_rejected() {
    let mut f = Fixture::new();
    f.ledger.is_initialized = 0;
    let accounts = f.stake_accounts(200);
    assert_stake_rejected(&f, accounts, 100, StakeError::NotInitialized.into());
}

#[test]
fn test_stake_foreign_ledger_owner_rejected() {
    let f = Fixture::new();
    let mut accounts = f.stake_accounts(200);
    accounts[LEDGER].owner = Pubkey::new_unique();
    assert_stake_rejected(&f, accounts, 100, ProgramError::IncorrectProgramId);
}

#[test]
fn test_stake_ledger_at_wrong_address_rejected() {
    let f = Fixture::new();
    let mut accounts = f.stake_accounts(200);
    accounts[LEDGER].key = Pubkey::new_unique();
    assert_stake_rejected(&f, accounts, 100, StakeError::InvalidPda.into());
}

#[test]
fn test_stake_wrong_store_rejected() {
    let f = Fixture::new();
    let mut accounts = f.stake_accounts(200);
    accounts[4].key = Pubkey::new_unique();
    assert_stake_rejected(&f, accounts, 100, StakeError::InvalidStore.into());
}

#[test]
fn test_stake_fake_token_program_rejected() {
    let f = Fixture::new();
    let mut accounts = f.stake_accounts(200);
    accounts[5] = TestAccount::program(Pubkey::new_unique());
    assert_stake_rejected(&f, accounts, 100, ProgramError::IncorrectProgramId);
}

#[test]
fn test_stake_wrong_record_address_rejected() {
    let f = Fixture::new();
    let mut accounts = f.stake_accounts(200);
    accounts[RECORD].key = Pubkey::new_unique();
    assert_stake_rejected(&f, accounts, 100, StakeError::InvalidPda.into());
}

#[test]
fn test_stake_at_minimum_rejected() {
    let f = Fixture::new();
    let accounts = f.stake_accounts(200);
    assert_stake_rejected(&f, accounts, 5, StakeError::BelowMinimumContribution.into());
}

#[test]
fn test_stake_without_balance_rejected() {
    let f = Fixture::new();
    let accounts = f.stake_accounts(50);
    assert_stake_rejected(&f, accounts, 100, StakeError::TransferRejected.into());
}

#[test]
fn test_stake_into_prefunded_record_address_gets_past_checks() {
    // A stray lamport on the record address still reads as "no record";
    // the stake is then refused only for the staker's own balance
    let f = Fixture::new();
    let mut accounts = f.stake_accounts(50);
    accounts[RECORD].lamports = 1;
    assert_stake_rejected(&f, accounts, 100, StakeError::TransferRejected.into());
}

#[test]
fn test_stake_record_of_other_staker_rejected() {
    let f = Fixture::new();
    let mut accounts = f.stake_accounts(200);
    let mut foreign = f.record(92);
    foreign.staker = Pubkey::new_unique().to_bytes();
    accounts[RECORD].owner = f.program_id;
    accounts[RECORD].data = bytemuck::bytes_of(&foreign).to_vec();
    assert_stake_rejected(&f, accounts, 100, StakeError::Unauthorized.into());
}

// ═══════════════════════════════════════════════════════════════
// 2: RemoveStake
// ═══════════════════════════════════════════════════════════════

fn assert_remove_rejected(f: &Fixture, mut accounts: Vec<TestAccount>, expected: ProgramError) {
    let ledger_before = accounts[LEDGER].data.clone();
    let record_before = accounts[RECORD].data.clone();

    assert_eq!(run(&f.program_id, &mut accounts, StakeInstruction::RemoveStake), Err(expected));
    assert_eq!(accounts[LEDGER].data, ledger_before);
    assert_eq!(accounts[RECORD].data, record_before);
}

#[test]
fn test_remove_requires_staker_signature() {
    let f = Fixture::new();
    let mut accounts = f.remove_accounts(Some(f.record(92)));
    accounts[0].is_signer = false;
    assert_remove_rejected(&f, accounts, ProgramError::MissingRequiredSignature);
}

#[test]
fn test_remove_short_ledger_data_not_initialized() {
    let f = Fixture::new();
    let mut accounts = f.remove_accounts(Some(f.record(92)));
    accounts[LEDGER].data = vec![0u8; 10];
    assert_remove_rejected(&f, accounts, StakeError::NotInitialized.into());
}

#[test]
fn test_remove_wrong_store_rejected() {
    let f = Fixture::new();
    let mut accounts = f.remove_accounts(Some(f.record(92)));
    accounts[4].key = Pubkey::new_unique();
    assert_remove_rejected(&f, accounts, StakeError::InvalidStore.into());
}

#[test]
fn test_remove_fake_token_program_rejected() {
    let f = Fixture::new();
    let mut accounts = f.remove_accounts(Some(f.record(92)));
    accounts[6] = TestAccount::program(Pubkey::new_unique());
    assert_remove_rejected(&f, accounts, ProgramError::IncorrectProgramId);
}

#[test]
fn test_remove_wrong_record_address_rejected() {
    let f = Fixture::new();
    let mut accounts = f.remove_accounts(Some(f.record(92)));
    accounts[RECORD].key = Pubkey::new_unique();
    assert_remove_rejected(&f, accounts, StakeError::InvalidPda.into());
}

#[test]
fn test_remove_wrong_store_authority_rejected() {
    let f = Fixture::new();
    let mut accounts = f.remove_accounts(Some(f.record(92)));
    accounts[5].key = Pubkey::new_unique();
    assert_remove_rejected(&f, accounts, StakeError::InvalidPda.into());
}

#[test]
fn test_remove_never_contributed() {
    let f = Fixture::new();
    let accounts = f.remove_accounts(None);
    assert_remove_rejected(&f, accounts, StakeError::NeverContributed.into());
}

#[test]
fn test_remove_without_store_approval_rejected() {
    // Store is owned by the custodian with no delegate: release is refused
    // and the record stays withdrawable
    let f = Fixture::new();
    let accounts = f.remove_accounts(Some(f.record(92)));
    assert_remove_rejected(&f, accounts, StakeError::TransferRejected.into());
}
