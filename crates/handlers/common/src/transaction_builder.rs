//! Constructors for the marketplace's programmable transactions.
//!
//! Every builder validates its inputs before producing anything and is
//! deterministic: the same inputs always yield the same transaction.

use rwa_primitives::{
    errors::MarketError,
    rpc::{Address, CreatePropertyParams, ObjectId},
    transaction::{MoveTarget, TransactionBuilder, UnsignedTransaction},
    types::DisplayAmount,
};

use crate::PROPERTY_MODULE;

pub const CREATE_PROPERTY_GAS_BUDGET: u64 = 10_000_000;
pub const INVEST_GAS_BUDGET: u64 = 50_000_000;
pub const TRANSFER_GAS_BUDGET: u64 = 30_000_000;

/// Number of arguments `property_nft::create_property` takes.
pub const CREATE_PROPERTY_ARITY: usize = 9;

fn invalid(message: impl Into<String>) -> MarketError {
    MarketError::InvalidArgument(message.into())
}

fn positive(value: u64, name: &str) -> Result<u64, MarketError> {
    if value == 0 {
        return Err(invalid(format!("{} must be greater than zero", name)));
    }
    Ok(value)
}

/// Convert a display amount to base units, rejecting zero.
pub fn to_base_units(amount: &DisplayAmount, name: &str) -> Result<u64, MarketError> {
    let units = amount
        .to_base_units()
        .map_err(|e| invalid(format!("{}: {}", name, e)))?;
    positive(units, name)
}

fn target(package: ObjectId, function: &str) -> MoveTarget {
    MoveTarget::new(package, PROPERTY_MODULE, function)
}

/// Mint a property NFT.
///
/// Pure inputs are pushed in the exact positional order of the Move
/// function: name, description, image_url, location, property_type,
/// total_value, total_shares, price_per_share (base units), rental_yield.
pub fn build_create_property(
    package: ObjectId,
    params: &CreatePropertyParams,
) -> Result<UnsignedTransaction, MarketError> {
    if params.name.trim().is_empty() {
        return Err(invalid("property name must not be empty"));
    }
    let total_value = positive(params.total_value, "total value")?;
    let total_shares = positive(params.total_shares, "total shares")?;
    let price_per_share = to_base_units(&params.price_per_share, "price per share")?;

    let mut tx = TransactionBuilder::new();
    let arguments = vec![
        tx.pure_string(params.name.as_str()),
        tx.pure_string(params.description.as_str()),
        tx.pure_string(params.image_url.as_str()),
        tx.pure_string(params.location.as_str()),
        tx.pure_string(params.property_type.as_str()),
        tx.pure_u64(total_value),
        tx.pure_u64(total_shares),
        tx.pure_u64(price_per_share),
        tx.pure_string(params.rental_yield.as_str()),
    ];
    tx.move_call(target(package, "create_property"), arguments);
    tx.set_gas_budget(CREATE_PROPERTY_GAS_BUDGET);
    Ok(tx.finish())
}

/// Buy `shares` of a property, paying `payment_amount` split off the gas coin.
pub fn build_invest(
    package: ObjectId,
    property_id: ObjectId,
    shares: u64,
    payment_amount: &DisplayAmount,
) -> Result<UnsignedTransaction, MarketError> {
    let shares = positive(shares, "share count")?;
    let payment = to_base_units(payment_amount, "payment amount")?;

    let mut tx = TransactionBuilder::new();
    let amount = tx.pure_u64(payment);
    let coins = tx.split_coins(tx.gas(), vec![amount]);
    let property = tx.object(property_id);
    let shares = tx.pure_u64(shares);
    tx.move_call(target(package, "invest"), vec![property, coins[0], shares]);
    tx.set_gas_budget(INVEST_GAS_BUDGET);
    Ok(tx.finish())
}

/// Hand an investment object over to `recipient`.
pub fn build_transfer(
    package: ObjectId,
    investment_id: ObjectId,
    recipient: Address,
) -> Result<UnsignedTransaction, MarketError> {
    if recipient == Address::ZERO {
        return Err(invalid("recipient must not be the zero address"));
    }
    let mut tx = TransactionBuilder::new();
    let investment = tx.object(investment_id);
    let recipient = tx.pure_address(recipient);
    tx.move_call(target(package, "transfer_investment"), vec![investment, recipient]);
    tx.set_gas_budget(TRANSFER_GAS_BUDGET);
    Ok(tx.finish())
}

/// Send `amount` of the native coin to `recipient`.
pub fn build_coin_transfer(
    recipient: Address,
    amount: &DisplayAmount,
) -> Result<UnsignedTransaction, MarketError> {
    let amount = to_base_units(amount, "amount")?;
    let mut tx = TransactionBuilder::new();
    let amount = tx.pure_u64(amount);
    let coins = tx.split_coins(tx.gas(), vec![amount]);
    let recipient = tx.pure_address(recipient);
    tx.transfer_objects(coins, recipient);
    Ok(tx.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::*;
    use rwa_primitives::transaction::{Argument, CallArg, Command, PureValue};
    use rwa_tests_utils::fixtures::{id, package_id, villa_params};

    fn pure(arg: &CallArg) -> &PureValue {
        match arg {
            CallArg::Pure { value } => value,
            other => panic!("expected pure input, got {:?}", other),
        }
    }

    #[rstest]
    fn test_create_property_argument_order(package_id: ObjectId, villa_params: CreatePropertyParams) {
        let tx = build_create_property(package_id, &villa_params).unwrap();

        assert_eq!(tx.inputs().len(), CREATE_PROPERTY_ARITY);
        let values: Vec<&PureValue> = tx.inputs().iter().map(pure).collect();
        assert_eq!(
            values,
            vec![
                &PureValue::String("Test Villa".to_string()),
                &PureValue::String(villa_params.description.clone()),
                &PureValue::String(villa_params.image_url.clone()),
                &PureValue::String(villa_params.location.clone()),
                &PureValue::String(villa_params.property_type.clone()),
                &PureValue::U64(10_000),
                &PureValue::U64(1000),
                &PureValue::U64(10_000_000_000),
                &PureValue::String("6.5%".to_string()),
            ]
        );

        assert_matches!(
            &tx.commands()[..],
            [Command::MoveCall { target, arguments, type_arguments }] => {
                assert_eq!(target.to_string(), format!("{}::property_nft::create_property", package_id));
                assert_eq!(arguments, &(0..9).map(Argument::Input).collect::<Vec<_>>());
                assert!(type_arguments.is_empty());
            }
        );
        assert_eq!(tx.gas_budget(), Some(CREATE_PROPERTY_GAS_BUDGET));
        assert_eq!(tx.sender(), None);
    }

    #[rstest]
    fn test_create_property_is_deterministic(package_id: ObjectId, villa_params: CreatePropertyParams) {
        let first = build_create_property(package_id, &villa_params).unwrap();
        let second = build_create_property(package_id, &villa_params).unwrap();
        assert_eq!(first, second);
    }

    #[rstest]
    #[case::empty_name(|p: &mut CreatePropertyParams| p.name = "  ".to_string())]
    #[case::zero_value(|p: &mut CreatePropertyParams| p.total_value = 0)]
    #[case::zero_shares(|p: &mut CreatePropertyParams| p.total_shares = 0)]
    #[case::zero_price(|p: &mut CreatePropertyParams| p.price_per_share = "0".into())]
    #[case::bad_price(|p: &mut CreatePropertyParams| p.price_per_share = "ten".into())]
    #[case::huge_price(|p: &mut CreatePropertyParams| p.price_per_share = "99999999999999".into())]
    fn test_create_property_rejects_invalid_input(
        package_id: ObjectId,
        mut villa_params: CreatePropertyParams,
        #[case] mutate: fn(&mut CreatePropertyParams),
    ) {
        mutate(&mut villa_params);
        assert_matches!(
            build_create_property(package_id, &villa_params),
            Err(MarketError::InvalidArgument(_))
        );
    }

    #[rstest]
    fn test_invest_splits_payment_from_gas(package_id: ObjectId) {
        let property = id("0xabc");
        let tx = build_invest(package_id, property, 5, &"2.5".into()).unwrap();

        assert_eq!(
            tx.inputs(),
            &[
                CallArg::Pure { value: PureValue::U64(2_500_000_000) },
                CallArg::Object { object_id: property },
                CallArg::Pure { value: PureValue::U64(5) },
            ]
        );
        assert_eq!(
            tx.commands()[0],
            Command::SplitCoins {
                coin: Argument::GasCoin,
                amounts: vec![Argument::Input(0)],
            }
        );
        assert_matches!(&tx.commands()[1], Command::MoveCall { target, arguments, .. } => {
            assert_eq!(target.function, "invest");
            assert_eq!(
                arguments,
                &vec![Argument::Input(1), Argument::NestedResult(0, 0), Argument::Input(2)]
            );
        });
        assert_eq!(tx.gas_budget(), Some(INVEST_GAS_BUDGET));
    }

    #[rstest]
    #[case(0, "1")]
    #[case(3, "0")]
    #[case(3, "")]
    #[case(3, "-1")]
    fn test_invest_rejects_non_positive(package_id: ObjectId, #[case] shares: u64, #[case] payment: &str) {
        assert_matches!(
            build_invest(package_id, id("0xabc"), shares, &payment.into()),
            Err(MarketError::InvalidArgument(_))
        );
    }

    #[rstest]
    fn test_transfer_investment(package_id: ObjectId) {
        let recipient = id("0xb0b");
        let tx = build_transfer(package_id, id("0x1"), recipient).unwrap();
        assert_eq!(
            tx.inputs()[1],
            CallArg::Pure { value: PureValue::Address(recipient) }
        );
        assert_eq!(tx.move_targets().next().unwrap().function, "transfer_investment");
        assert_eq!(tx.gas_budget(), Some(TRANSFER_GAS_BUDGET));

        assert_matches!(
            build_transfer(package_id, id("0x1"), Address::ZERO),
            Err(MarketError::InvalidArgument(_))
        );
    }

    #[test]
    fn test_coin_transfer() {
        let tx = build_coin_transfer(id("0xb0b"), &"0.1".into()).unwrap();
        assert_eq!(tx.inputs()[0], CallArg::Pure { value: PureValue::U64(100_000_000) });
        assert_eq!(
            tx.commands()[1],
            Command::TransferObjects {
                objects: vec![Argument::NestedResult(0, 0)],
                address: Argument::Input(1),
            }
        );
        assert_eq!(tx.move_targets().count(), 0);
    }
}
