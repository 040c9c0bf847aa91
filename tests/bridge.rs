// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

mod common;

use common::{started_bridge, MockSpi, MockUart, TestBridge};
use spibridge::config::{BridgeConfig, MODE_3};
use spibridge::{BridgeDirection, DrainState, Error, ErrorFlags};

#[test]
fn peripherals_are_configured_before_interrupts_are_enabled() {
    let config = BridgeConfig::default().with_spi_mode(MODE_3).with_baud_rate(9_600);
    let mut bridge = TestBridge::<8>::new(MockSpi::default(), MockUart::default(), &config).unwrap();

    assert_eq!(bridge.spi().config, Some(config.spi));
    assert_eq!(bridge.uart().config, Some(config.uart));
    assert!(!bridge.spi().interrupts_enabled);
    assert!(!bridge.uart().interrupts_enabled);
    assert!(!bridge.spi_state().is_enabled());

    bridge.start();
    assert!(bridge.spi().interrupts_enabled);
    assert!(bridge.uart().interrupts_enabled);
    assert!(bridge.spi_state().is_enabled());
    assert!(bridge.uart_state().is_enabled());
    assert_eq!(bridge.uart_state().config().baud_rate, 9_600);
}

#[test]
fn invalid_configuration_is_refused() {
    let zero_baud = BridgeConfig::default().with_baud_rate(0);
    let result = TestBridge::<8>::new(MockSpi::default(), MockUart::default(), &zero_baud);
    assert_eq!(result.err(), Some(Error::InvalidConfig));

    let spi = MockSpi {
        reject_config: true,
        ..MockSpi::default()
    };
    let result = TestBridge::<8>::new(spi, MockUart::default(), &BridgeConfig::default());
    assert_eq!(result.err(), Some(Error::InvalidConfig));
}

#[test]
fn byte_into_idle_uart_is_sent_from_the_push_path() {
    let mut bridge = started_bridge::<8>(&BridgeConfig::default());

    bridge.spi_mut().receive(0x7E);
    bridge.on_spi_receive();

    // Primed directly, before any transmit-ready interrupt.
    assert_eq!(bridge.uart().sent, [0x7E]);
    assert!(bridge.uart().tx_interrupt);
    let channel = bridge.channel(BridgeDirection::SpiToUart);
    assert_eq!(channel.state(), DrainState::Draining);
    assert!(channel.is_empty());

    // The next transmit-ready cycle finds nothing and quiesces the UART.
    bridge.on_uart_tx_ready();
    assert_eq!(bridge.uart().sent, [0x7E]);
    assert!(!bridge.uart().tx_interrupt);
    assert_eq!(
        bridge.channel(BridgeDirection::SpiToUart).state(),
        DrainState::Idle
    );
}

#[test]
fn busy_uart_is_drained_one_byte_per_transmit_ready() {
    let mut bridge = started_bridge::<8>(&BridgeConfig::default());
    bridge.uart_mut().tx_busy = true;

    bridge.spi_mut().receive_all(&[0x41, 0x42, 0x43]);
    for _ in 0..3 {
        bridge.on_spi_receive();
    }
    assert!(bridge.uart().sent.is_empty());
    assert!(bridge.uart().tx_interrupt);
    assert_eq!(bridge.channel(BridgeDirection::SpiToUart).len(), 3);

    bridge.uart_mut().tx_busy = false;
    bridge.on_uart_tx_ready();
    assert_eq!(bridge.uart().sent, [0x41]);
    bridge.on_uart_tx_ready();
    bridge.on_uart_tx_ready();
    assert_eq!(bridge.uart().sent, [0x41, 0x42, 0x43]);
    assert_eq!(
        bridge.channel(BridgeDirection::SpiToUart).state(),
        DrainState::Draining
    );

    bridge.on_uart_tx_ready();
    assert!(!bridge.uart().tx_interrupt);
    assert_eq!(
        bridge.channel(BridgeDirection::SpiToUart).state(),
        DrainState::Idle
    );
}

#[test]
fn stream_arrives_in_order_with_intermittent_uart_stalls() {
    let mut bridge = started_bridge::<16>(&BridgeConfig::default());
    let input: Vec<u8> = (0..200u32).map(|i| (i * 7 + 3) as u8).collect();

    for (i, &byte) in input.iter().enumerate() {
        bridge.uart_mut().tx_busy = i % 3 == 0;
        bridge.spi_mut().receive(byte);
        bridge.service_spi_interrupt();
        bridge.service_uart_interrupt();
        bridge.service_uart_interrupt();
    }
    bridge.uart_mut().tx_busy = false;
    while bridge.channel(BridgeDirection::SpiToUart).state() == DrainState::Draining {
        bridge.service_uart_interrupt();
    }

    assert_eq!(bridge.uart().sent, input);
    let stats = bridge.channel(BridgeDirection::SpiToUart).stats();
    assert_eq!(stats.bytes_in, 200);
    assert_eq!(stats.bytes_out, 200);
    assert_eq!(stats.dropped, 0);
    assert!(bridge.status().spi_to_uart.errors.is_empty());
}

#[test]
fn overflow_rejects_newest_bytes_and_is_reported() {
    let mut bridge = started_bridge::<4>(&BridgeConfig::default());
    bridge.uart_mut().tx_busy = true;

    bridge
        .spi_mut()
        .receive_all(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
    for _ in 0..6 {
        bridge.on_spi_receive();
    }

    let status = bridge.status();
    assert_eq!(status.spi_to_uart.len, 4);
    assert_eq!(status.spi_to_uart.errors, ErrorFlags::OVERFLOW);
    assert_eq!(status.spi_to_uart.stats.bytes_in, 6);
    assert_eq!(status.spi_to_uart.stats.dropped, 2);

    bridge.uart_mut().tx_busy = false;
    for _ in 0..5 {
        bridge.on_uart_tx_ready();
    }
    assert_eq!(bridge.uart().sent, [0x01, 0x02, 0x03, 0x04]);
}

#[test]
fn empty_uart_to_spi_buffer_sends_filler_and_latches_underflow() {
    let mut bridge = started_bridge::<8>(&BridgeConfig::default());

    bridge.on_spi_byte_requested();

    assert_eq!(bridge.spi().sent, [0xFF]);
    let status = bridge.status();
    assert_eq!(status.uart_to_spi.errors, ErrorFlags::UNDERFLOW);
    assert_eq!(status.uart_to_spi.stats.fillers, 1);
    assert_eq!(status.uart_to_spi.len, 0);
}

#[test]
fn filler_byte_is_configurable() {
    let mut bridge = started_bridge::<8>(&BridgeConfig::default().with_filler(0x00));
    bridge.on_spi_byte_requested();
    bridge.on_spi_byte_requested();
    assert_eq!(bridge.spi().sent, [0x00, 0x00]);
}

#[test]
fn uart_bytes_are_shifted_out_to_the_master_in_order() {
    let mut bridge = started_bridge::<8>(&BridgeConfig::default());
    bridge.spi_mut().tx_busy = true;

    bridge.uart_mut().receive_all(&[0xA1, 0xA2]);
    bridge.on_uart_receive();
    bridge.on_uart_receive();
    assert_eq!(bridge.channel(BridgeDirection::UartToSpi).len(), 2);
    assert_eq!(
        bridge.channel(BridgeDirection::UartToSpi).state(),
        DrainState::Draining
    );

    bridge.spi_mut().tx_busy = false;
    bridge.on_spi_byte_requested();
    bridge.on_spi_byte_requested();
    assert_eq!(bridge.spi().sent, [0xA1, 0xA2]);
    assert!(bridge.status().uart_to_spi.errors.is_empty());

    bridge.on_spi_byte_requested();
    assert_eq!(bridge.spi().sent, [0xA1, 0xA2, 0xFF]);
    let status = bridge.status();
    assert_eq!(status.uart_to_spi.state, DrainState::Idle);
    assert_eq!(status.uart_to_spi.errors, ErrorFlags::UNDERFLOW);
    assert_eq!(status.uart_to_spi.stats.bytes_out, 2);
}

#[test]
fn uart_frame_error_drops_the_byte_and_latches() {
    let mut bridge = started_bridge::<8>(&BridgeConfig::default());
    bridge.spi_mut().tx_busy = true;

    bridge.uart_mut().fault(Error::HardwareFrameError);
    bridge.uart_mut().receive(0x55);
    bridge.service_uart_interrupt();
    bridge.service_uart_interrupt();

    assert_eq!(bridge.channel(BridgeDirection::UartToSpi).len(), 1);
    assert_eq!(bridge.uart_state().errors(), ErrorFlags::FRAME);

    let status = bridge.status();
    assert_eq!(status.uart_to_spi.errors, ErrorFlags::FRAME);
    assert!(status.spi_to_uart.errors.is_empty());

    let (spi_errors, uart_errors) = bridge.clear_peripheral_errors();
    assert!(spi_errors.is_empty());
    assert_eq!(uart_errors, ErrorFlags::FRAME);
    assert!(bridge.uart_state().errors().is_empty());
}

#[test]
fn spi_overrun_is_latched_on_peripheral_and_direction() {
    let mut bridge = started_bridge::<8>(&BridgeConfig::default());

    bridge.spi_mut().fault(Error::HardwareOverrun);
    bridge.on_spi_receive();

    assert!(bridge.uart().sent.is_empty());
    assert_eq!(bridge.spi_state().errors(), ErrorFlags::OVERRUN);
    assert_eq!(bridge.status().spi_to_uart.errors, ErrorFlags::OVERRUN);
}

#[test]
fn status_takes_latched_errors() {
    let mut bridge = started_bridge::<8>(&BridgeConfig::default());
    bridge.on_spi_byte_requested();

    assert_eq!(bridge.status().uart_to_spi.errors, ErrorFlags::UNDERFLOW);
    assert!(bridge.status().uart_to_spi.errors.is_empty());
}

#[test]
fn spi_vector_handles_receive_and_transmit_in_one_pass() {
    let mut bridge = started_bridge::<8>(&BridgeConfig::default());

    bridge.spi_mut().receive(0x10);
    bridge.service_spi_interrupt();

    assert_eq!(bridge.uart().sent, [0x10]);
    assert_eq!(bridge.spi().sent, [0xFF]);
}

#[test]
fn idle_uart_vector_does_nothing() {
    let mut bridge = started_bridge::<8>(&BridgeConfig::default());

    bridge.service_uart_interrupt();

    assert!(bridge.uart().sent.is_empty());
    assert!(!bridge.uart().tx_interrupt);
    assert_eq!(
        bridge.channel(BridgeDirection::SpiToUart).state(),
        DrainState::Idle
    );
}

#[test]
fn polling_relays_both_directions() {
    let mut bridge = started_bridge::<8>(&BridgeConfig::default());
    bridge.spi_mut().receive_all(&[1, 2, 3]);
    bridge.uart_mut().receive(9);

    while !bridge.spi().rx.is_empty() || !bridge.uart().rx.is_empty() {
        bridge.poll();
    }

    assert_eq!(bridge.uart().sent, [1, 2, 3]);
    let data: Vec<u8> = bridge
        .spi()
        .sent
        .iter()
        .copied()
        .filter(|&b| b != 0xFF)
        .collect();
    assert_eq!(data, [9]);
}

#[test]
fn directions_are_independent() {
    let mut bridge = started_bridge::<4>(&BridgeConfig::default());
    bridge.uart_mut().tx_busy = true;

    bridge.spi_mut().receive_all(&[1, 2, 3, 4, 5]);
    for _ in 0..5 {
        bridge.on_spi_receive();
    }
    bridge.uart_mut().receive_all(&[0x61, 0x62]);
    bridge.on_uart_receive();
    bridge.on_uart_receive();
    bridge.on_spi_byte_requested();

    // SPI->UART is full and stalled, UART->SPI still flows.
    assert_eq!(bridge.spi().sent, [0x61, 0x62]);
    let status = bridge.status();
    assert_eq!(status.spi_to_uart.errors, ErrorFlags::OVERFLOW);
    assert!(status.uart_to_spi.errors.is_empty());
}

#[test]
fn transmit_ready_while_uart_busy_keeps_the_queue() {
    let mut bridge = started_bridge::<8>(&BridgeConfig::default());
    bridge.uart_mut().tx_busy = true;

    bridge.spi_mut().receive_all(&[0x41, 0x42]);
    bridge.on_spi_receive();
    bridge.on_spi_receive();

    // Event arrives while the transmitter is still busy.
    bridge.on_uart_tx_ready();
    assert_eq!(bridge.channel(BridgeDirection::SpiToUart).len(), 2);
    assert!(bridge.uart().tx_interrupt);

    bridge.uart_mut().tx_busy = false;
    while bridge.channel(BridgeDirection::SpiToUart).state() == DrainState::Draining {
        bridge.on_uart_tx_ready();
    }

    assert_eq!(bridge.uart().sent, [0x41, 0x42]);
    let status = bridge.status();
    assert_eq!(status.spi_to_uart.stats.dropped, 0);
    assert_eq!(status.spi_to_uart.stats.bytes_out, 2);
    assert!(status.spi_to_uart.errors.is_empty());
}

#[test]
fn byte_request_while_spi_busy_sends_nothing() {
    let mut bridge = started_bridge::<8>(&BridgeConfig::default());
    bridge.spi_mut().tx_busy = true;
    bridge.uart_mut().receive(0x33);
    bridge.on_uart_receive();

    bridge.on_spi_byte_requested();
    bridge.on_spi_byte_requested();
    assert_eq!(bridge.channel(BridgeDirection::UartToSpi).len(), 1);
    assert!(bridge.status().uart_to_spi.errors.is_empty());

    bridge.spi_mut().tx_busy = false;
    bridge.on_spi_byte_requested();
    assert_eq!(bridge.spi().sent, [0x33]);
}

#[test]
fn byte_refused_by_a_ready_sink_is_reported_as_loss() {
    let mut bridge = started_bridge::<8>(&BridgeConfig::default());
    bridge.uart_mut().refuse_send = true;

    bridge.spi_mut().receive(0x5A);
    bridge.on_spi_receive();

    let status = bridge.status();
    assert_eq!(status.spi_to_uart.stats.dropped, 1);
    assert_eq!(status.spi_to_uart.errors, ErrorFlags::OVERRUN);
    assert!(status.spi_to_uart.errors.intersects(ErrorFlags::DATA_LOSS));
}
